use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "helpdesk";
const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_TABLE: &str = "Tickets";

pub const ENV_CONFIG_DIR: &str = "HELPDESK_CONFIG_DIR";
pub const ENV_BACKEND_URL: &str = "HELPDESK_BACKEND_URL";
pub const ENV_API_KEY: &str = "HELPDESK_API_KEY";
pub const ENV_TABLE: &str = "HELPDESK_TABLE";

/// Connection details for the hosted backend. Built once and handed to the
/// gateway constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub config_dir: PathBuf,
}

/// What `config init` writes to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
    pub table: Option<String>,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let lookup = |key: &str| env::var(key).ok();
        let config_dir = resolve_config_directory(lookup)?;
        let stored = StoredConfig::load_from(&config_dir.join(CONFIG_FILE_NAME))?;
        Ok(Self::from_sources(config_dir, stored, lookup))
    }

    /// Layers environment overrides on top of the stored file.
    pub fn from_sources<F>(config_dir: PathBuf, stored: StoredConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, stored: Option<String>| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .or(stored)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_url = pick(ENV_BACKEND_URL, stored.backend_url);
        let api_key = pick(ENV_API_KEY, stored.api_key);
        let table = pick(ENV_TABLE, stored.table).unwrap_or_else(|| DEFAULT_TABLE.to_string());

        if base_url.is_none() {
            warn!("backend URL not configured; set {ENV_BACKEND_URL} or run `helpdesk config init`");
        }
        if api_key.is_none() {
            warn!("backend API key not configured; set {ENV_API_KEY} or run `helpdesk config init`");
        }

        Self {
            backend: BackendConfig {
                base_url,
                api_key,
                table,
            },
            config_dir,
        }
    }
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored config, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    resolve_config_directory(|key| env::var(key).ok())
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

fn resolve_config_directory<F>(lookup: F) -> AppResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(dir) = non_empty(ENV_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join(APP_DIR_NAME));
    }
    if let Some(home) = non_empty("HOME") {
        return Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME));
    }
    Err(AppError::Configuration(
        "cannot locate a config directory; set HELPDESK_CONFIG_DIR".to_string(),
    ))
}
