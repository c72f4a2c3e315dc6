use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Open,
    Resolved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Resolved => "Resolved",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "open" => Some(Status::Open),
            "resolved" => Some(Status::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-assigned record identifier. The backend may hand out integer or
/// text keys, so the value is kept in its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(pub String);

impl TicketId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TicketId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(value) => TicketId(value.to_string()),
            RawId::Text(value) => TicketId(value),
        })
    }
}

/// The mutable part of a ticket: what the creation form collects and what an
/// edit session works on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFields {
    pub name: String,
    pub email: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
}

impl TicketFields {
    pub fn set(&mut self, field: TicketField, value: &str) -> AppResult<()> {
        match field {
            TicketField::Name => self.name = value.to_string(),
            TicketField::Email => self.email = value.to_string(),
            TicketField::Title => self.title = value.to_string(),
            TicketField::Description => self.description = value.to_string(),
            TicketField::Priority => {
                self.priority = Priority::from_str(value).ok_or_else(|| {
                    AppError::Validation(format!("unknown priority '{value}'"))
                })?
            }
            TicketField::Status => {
                self.status = Status::from_str(value)
                    .ok_or_else(|| AppError::Validation(format!("unknown status '{value}'")))?
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketField {
    Name,
    Email,
    Title,
    Description,
    Priority,
    Status,
}

impl TicketField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketField::Name => "name",
            TicketField::Email => "email",
            TicketField::Title => "title",
            TicketField::Description => "description",
            TicketField::Priority => "priority",
            TicketField::Status => "status",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" => Some(TicketField::Name),
            "email" => Some(TicketField::Email),
            "title" => Some(TicketField::Title),
            "description" => Some(TicketField::Description),
            "priority" => Some(TicketField::Priority),
            "status" => Some(TicketField::Status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub name: String,
    pub email: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn fields(&self) -> TicketFields {
        TicketFields {
            name: self.name.clone(),
            email: self.email.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.status,
        }
    }
}

/// Partial update body. Unset fields are left out of the payload entirely;
/// identifier and creation time are never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TicketChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TicketChanges {
    pub fn resolve() -> Self {
        Self {
            status: Some(Status::Resolved),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<TicketFields> for TicketChanges {
    fn from(fields: TicketFields) -> Self {
        Self {
            name: Some(fields.name),
            email: Some(fields.email),
            title: Some(fields.title),
            description: Some(fields.description),
            priority: Some(fields.priority),
            status: Some(fields.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_priority_and_status_case_insensitively() {
        assert_eq!(Priority::from_str("HIGH"), Some(Priority::High));
        assert_eq!(Priority::from_str(" medium "), Some(Priority::Medium));
        assert_eq!(Priority::from_str("urgent"), None);
        assert_eq!(Status::from_str("resolved"), Some(Status::Resolved));
        assert_eq!(Status::from_str("closed"), None);
    }

    #[test]
    fn deserializes_backend_row_with_numeric_id() {
        let row = r#"{
            "id": 42,
            "name": "Ada",
            "email": "ada@example.com",
            "title": "Printer jam",
            "description": "Paper stuck",
            "priority": "High",
            "status": "Open",
            "created_at": "2025-06-21T00:36:18.123456+00:00"
        }"#;
        let ticket: Ticket = serde_json::from_str(row).unwrap();
        assert_eq!(ticket.id, TicketId::new("42"));
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.status, Status::Open);
    }

    #[test]
    fn deserializes_backend_row_with_text_id() {
        let row = r#"{
            "id": "8f14e45f-ceea-467f-a0e6-0a4c1b2d3e4f",
            "name": "Ada",
            "email": "ada@example.com",
            "title": "Printer jam",
            "description": "Paper stuck",
            "priority": "Low",
            "status": "Resolved",
            "created_at": "2025-06-21T00:36:18Z"
        }"#;
        let ticket: Ticket = serde_json::from_str(row).unwrap();
        assert_eq!(ticket.id.as_str(), "8f14e45f-ceea-467f-a0e6-0a4c1b2d3e4f");
        assert_eq!(ticket.status, Status::Resolved);
    }

    #[test]
    fn resolve_changes_only_carry_status() {
        let body = serde_json::to_value(TicketChanges::resolve()).unwrap();
        assert_eq!(body, serde_json::json!({ "status": "Resolved" }));
    }

    #[test]
    fn setting_unknown_priority_is_rejected() {
        let mut fields = TicketFields::default();
        assert!(fields.set(TicketField::Priority, "urgent").is_err());
        assert_eq!(fields.priority, Priority::Low);

        fields.set(TicketField::Status, "Resolved").unwrap();
        assert_eq!(fields.status, Status::Resolved);
    }
}
