use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ticket::TicketFields;
use crate::error::{AppError, AppResult};

const DRAFT_FILE_NAME: &str = "draft_cache.json";
const DRAFT_LIMIT: usize = 32;

#[derive(Default, Serialize, Deserialize)]
struct DraftFile {
    entries: Vec<DraftEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
struct DraftEntry {
    key: String,
    saved_at: DateTime<Utc>,
    fields: TicketFields,
}

/// Form contents whose submission failed, kept on disk so they can be
/// retried after the process exits.
pub struct DraftStore {
    file_path: PathBuf,
    file: DraftFile,
}

impl DraftStore {
    pub fn load(config_dir: &Path) -> AppResult<Self> {
        let path = config_dir.join(DRAFT_FILE_NAME);
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<DraftFile>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid draft file: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DraftFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            file,
        })
    }

    /// Most recently saved draft and its key.
    pub fn latest(&self) -> Option<(String, TicketFields)> {
        self.file
            .entries
            .last()
            .map(|entry| (entry.key.clone(), entry.fields.clone()))
    }

    pub fn insert(&mut self, key: String, fields: &TicketFields) {
        self.file.entries.retain(|entry| entry.key != key);
        self.file.entries.push(DraftEntry {
            key,
            saved_at: Utc::now(),
            fields: fields.clone(),
        });

        if self.file.entries.len() > DRAFT_LIMIT {
            let overflow = self.file.entries.len() - DRAFT_LIMIT;
            self.file.entries.drain(0..overflow);
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.file.entries.len();
        self.file.entries.retain(|entry| entry.key != key);
        self.file.entries.len() != before
    }

    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)
            .map_err(|err| AppError::Configuration(format!("failed to write drafts: {err}")))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}
