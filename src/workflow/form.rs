use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use blake3::Hasher;
use tracing::{error, info, warn};

use crate::domain::ticket::{Status, Ticket, TicketField, TicketFields};
use crate::error::{AppError, AppResult};
use crate::services::TicketStore;

pub const SUCCESS_MESSAGE: &str = "Ticket submitted successfully!";
pub const FAILURE_MESSAGE: &str = "Failed to submit ticket.";
pub const PENDING_MESSAGE: &str = "This ticket is already being submitted.";

const REQUIRED_FIELDS: [TicketField; 4] = [
    TicketField::Name,
    TicketField::Email,
    TicketField::Title,
    TicketField::Description,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Submitted(Ticket),
    Failed,
    Invalid(TicketField),
    AlreadyPending,
}

/// Tracks submissions that have not come back from the backend yet, keyed by
/// a fingerprint of the form contents.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: Mutex<HashSet<String>>,
}

pub struct InFlight<'a> {
    guard: &'a SubmissionGuard,
    key: String,
}

impl SubmissionGuard {
    /// Claims `key` until the returned handle is dropped; `None` if another
    /// submission already holds it.
    pub fn try_begin(&self, key: String) -> Option<InFlight<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(key.clone()) {
            return None;
        }
        Some(InFlight { guard: self, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}

/// The ticket creation form.
#[derive(Debug)]
pub struct TicketForm {
    fields: TicketFields,
    message: Option<&'static str>,
    guard: Arc<SubmissionGuard>,
}

impl Default for TicketForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketForm {
    pub fn new() -> Self {
        Self::with_guard(Arc::new(SubmissionGuard::default()))
    }

    pub fn with_guard(guard: Arc<SubmissionGuard>) -> Self {
        Self {
            fields: TicketFields::default(),
            message: None,
            guard,
        }
    }

    pub fn from_fields(fields: TicketFields) -> Self {
        let mut form = Self::new();
        form.fields = fields;
        form
    }

    pub fn fields(&self) -> &TicketFields {
        &self.fields
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// Status is not part of the form; new tickets always start Open.
    pub fn set(&mut self, field: TicketField, value: &str) -> AppResult<()> {
        if field == TicketField::Status {
            return Err(AppError::Validation(
                "status cannot be set on a new ticket".to_string(),
            ));
        }
        self.fields.set(field, value)
    }

    pub fn missing_field(&self) -> Option<TicketField> {
        REQUIRED_FIELDS.into_iter().find(|field| {
            let value = match field {
                TicketField::Name => &self.fields.name,
                TicketField::Email => &self.fields.email,
                TicketField::Title => &self.fields.title,
                _ => &self.fields.description,
            };
            value.trim().is_empty()
        })
    }

    pub fn fingerprint(&self) -> String {
        compute_key(&self.fields)
    }

    pub async fn submit(&mut self, store: &dyn TicketStore) -> FormOutcome {
        if let Some(field) = self.missing_field() {
            return FormOutcome::Invalid(field);
        }

        let mut payload = self.fields.clone();
        payload.status = Status::Open;

        let guard = Arc::clone(&self.guard);
        let Some(_in_flight) = guard.try_begin(compute_key(&payload)) else {
            warn!("duplicate submission ignored while the first is in flight");
            self.message = Some(PENDING_MESSAGE);
            return FormOutcome::AlreadyPending;
        };

        match store.insert_one(&payload).await {
            Ok(ticket) => {
                info!(id = %ticket.id, "ticket submitted");
                self.message = Some(SUCCESS_MESSAGE);
                self.fields = TicketFields::default();
                FormOutcome::Submitted(ticket)
            }
            Err(err) => {
                error!("Failed to submit ticket: {err}");
                self.message = Some(FAILURE_MESSAGE);
                FormOutcome::Failed
            }
        }
    }
}

pub fn compute_key(fields: &TicketFields) -> String {
    let mut hasher = Hasher::new();
    for part in [
        fields.name.as_str(),
        fields.email.as_str(),
        fields.title.as_str(),
        fields.description.as_str(),
        fields.priority.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::Priority;
    use crate::infra::memory::{MemoryStore, StoreCall};

    fn filled() -> TicketForm {
        let mut form = TicketForm::new();
        form.set(TicketField::Name, "Ada").unwrap();
        form.set(TicketField::Email, "ada@corp.com").unwrap();
        form.set(TicketField::Title, "VPN drops").unwrap();
        form.set(TicketField::Description, "Every hour").unwrap();
        form.set(TicketField::Priority, "High").unwrap();
        form
    }

    #[tokio::test]
    async fn submits_exactly_one_insert_with_open_status() {
        let store = MemoryStore::default();
        let mut form = filled();

        let outcome = form.submit(&store).await;
        assert!(matches!(outcome, FormOutcome::Submitted(_)));
        assert_eq!(form.message(), Some(SUCCESS_MESSAGE));
        assert_eq!(form.fields(), &TicketFields::default());

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        let StoreCall::Insert(sent) = &calls[0] else {
            panic!("expected insert, got {:?}", calls[0]);
        };
        assert_eq!(sent.name, "Ada");
        assert_eq!(sent.email, "ada@corp.com");
        assert_eq!(sent.title, "VPN drops");
        assert_eq!(sent.description, "Every hour");
        assert_eq!(sent.priority, Priority::High);
        assert_eq!(sent.status, Status::Open);
    }

    #[tokio::test]
    async fn failure_preserves_fields_for_retry() {
        let store = MemoryStore::default();
        store.fail_mutations(true);
        let mut form = filled();
        let before = form.fields().clone();

        assert_eq!(form.submit(&store).await, FormOutcome::Failed);
        assert_eq!(form.message(), Some(FAILURE_MESSAGE));
        assert_eq!(form.fields(), &before);

        store.fail_mutations(false);
        assert!(matches!(form.submit(&store).await, FormOutcome::Submitted(_)));
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn missing_required_field_makes_no_call() {
        let store = MemoryStore::default();
        let mut form = filled();
        form.set(TicketField::Email, "  ").unwrap();

        assert_eq!(
            form.submit(&store).await,
            FormOutcome::Invalid(TicketField::Email)
        );
        assert!(store.calls().is_empty());
    }

    #[test]
    fn status_is_not_settable() {
        let mut form = TicketForm::new();
        assert!(form.set(TicketField::Status, "Resolved").is_err());
    }

    #[tokio::test]
    async fn identical_submission_in_flight_is_refused() {
        let guard = Arc::new(SubmissionGuard::default());
        let mut first = filled();
        let key = first.fingerprint();
        let held = guard.try_begin(key.clone()).unwrap();

        let store = MemoryStore::default();
        first.guard = Arc::clone(&guard);
        assert_eq!(first.submit(&store).await, FormOutcome::AlreadyPending);
        assert!(store.calls().is_empty());

        drop(held);
        assert!(guard.try_begin(key).is_some());
        assert!(matches!(first.submit(&store).await, FormOutcome::Submitted(_)));
    }

    #[test]
    fn fingerprint_separates_fields() {
        let a = TicketFields {
            name: "ab".to_string(),
            email: "c".to_string(),
            ..TicketFields::default()
        };
        let b = TicketFields {
            name: "a".to_string(),
            email: "bc".to_string(),
            ..TicketFields::default()
        };
        assert_ne!(compute_key(&a), compute_key(&b));
    }
}
