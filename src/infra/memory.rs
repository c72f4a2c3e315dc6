use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::domain::ticket::{Priority, Status, Ticket, TicketChanges, TicketFields, TicketId};
use crate::error::{AppError, AppResult};
use crate::services::TicketStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    SelectAll,
    Insert(TicketFields),
    Update(TicketId, TicketChanges),
    Delete(TicketId),
}

#[derive(Default)]
struct Inner {
    rows: Vec<Ticket>,
    next_id: u64,
    calls: Vec<StoreCall>,
    fail_mutations: bool,
    fail_selects: bool,
}

/// Test double for the backend: keeps rows in insertion order and records
/// every call made against it.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<Ticket>) -> Self {
        let next_id = rows.len() as u64 + 1;
        Self {
            inner: Mutex::new(Inner {
                rows,
                next_id,
                ..Inner::default()
            }),
        }
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.inner.lock().unwrap().fail_mutations = fail;
    }

    pub fn fail_selects(&self, fail: bool) {
        self.inner.lock().unwrap().fail_selects = fail;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn rows(&self) -> Vec<Ticket> {
        self.inner.lock().unwrap().rows.clone()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn select_all(&self) -> AppResult<Vec<Ticket>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(StoreCall::SelectAll);
        if inner.fail_selects {
            return Err(AppError::Backend("select failed".to_string()));
        }
        Ok(inner.rows.clone())
    }

    async fn insert_one(&self, fields: &TicketFields) -> AppResult<Ticket> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(StoreCall::Insert(fields.clone()));
        if inner.fail_mutations {
            return Err(AppError::Backend("insert failed".to_string()));
        }
        if inner.next_id == 0 {
            inner.next_id = 1;
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let ticket = Ticket {
            id: TicketId(id.to_string()),
            name: fields.name.clone(),
            email: fields.email.clone(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            priority: fields.priority,
            status: fields.status,
            created_at: created_at(id),
        };
        inner.rows.push(ticket.clone());
        Ok(ticket)
    }

    async fn update_by_id(&self, id: &TicketId, changes: &TicketChanges) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(StoreCall::Update(id.clone(), changes.clone()));
        if inner.fail_mutations {
            return Err(AppError::Backend("update failed".to_string()));
        }
        // Matches zero rows without error, like an `eq` filter on the server.
        if let Some(row) = inner.rows.iter_mut().find(|row| &row.id == id) {
            let changes = changes.clone();
            if let Some(name) = changes.name {
                row.name = name;
            }
            if let Some(email) = changes.email {
                row.email = email;
            }
            if let Some(title) = changes.title {
                row.title = title;
            }
            if let Some(description) = changes.description {
                row.description = description;
            }
            if let Some(priority) = changes.priority {
                row.priority = priority;
            }
            if let Some(status) = changes.status {
                row.status = status;
            }
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &TicketId) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(StoreCall::Delete(id.clone()));
        if inner.fail_mutations {
            return Err(AppError::Backend("delete failed".to_string()));
        }
        inner.rows.retain(|row| &row.id != id);
        Ok(())
    }
}

fn created_at(seq: u64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 21, 9, 0, 0).unwrap() + chrono::Duration::minutes(seq as i64)
}

/// Builds a stored ticket with predictable fields for view tests.
pub fn ticket(id: u64, title: &str, email: &str, priority: Priority) -> Ticket {
    Ticket {
        id: TicketId(id.to_string()),
        name: format!("User {id}"),
        email: email.to_string(),
        title: title.to_string(),
        description: format!("Description for {title}"),
        priority,
        status: Status::Open,
        created_at: created_at(id),
    }
}
