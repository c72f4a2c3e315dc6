use tracing::{debug, error};

use crate::domain::ticket::{Ticket, TicketChanges, TicketField, TicketFields, TicketId};
use crate::error::{AppError, AppResult};
use crate::services::TicketStore;
use crate::workflow::filter::{PriorityFilter, TicketQuery};
use crate::workflow::page::{Page, paginate};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this ticket?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Display,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend accepted the change and the collection was re-fetched.
    Applied,
    /// The backend call failed; the error was logged and nothing changed locally.
    Failed,
    /// The user declined the confirmation; no backend call was made.
    Cancelled,
}

/// Working copy of the single row being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: TicketId,
    pub working: TicketFields,
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// In-memory view over the whole ticket collection.
///
/// Filtering and pagination are recomputed from the full collection on every
/// call to [`TicketListView::current_page`]. Every successful mutation is
/// followed by a full re-fetch.
#[derive(Debug)]
pub struct TicketListView {
    state: ViewState,
    tickets: Vec<Ticket>,
    query: TicketQuery,
    page: usize,
    editing: Option<EditSession>,
}

impl Default for TicketListView {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketListView {
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            tickets: Vec::new(),
            query: TicketQuery::default(),
            page: 1,
            editing: None,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn query(&self) -> &TicketQuery {
        &self.query
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn row_mode(&self, id: &TicketId) -> RowMode {
        match &self.editing {
            Some(session) if &session.id == id => RowMode::Editing,
            _ => RowMode::Display,
        }
    }

    /// Replaces the whole local collection with the backend's. Returns
    /// whether the fetch succeeded; on failure the previous copy is kept.
    pub async fn fetch(&mut self, store: &dyn TicketStore) -> bool {
        let fetched = match store.select_all().await {
            Ok(tickets) => {
                debug!(count = tickets.len(), "fetched tickets");
                self.tickets = tickets;
                true
            }
            Err(err) => {
                error!("Error fetching tickets: {err}");
                false
            }
        };
        self.state = ViewState::Loaded;
        fetched
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
        self.page = 1;
    }

    pub fn set_priority_filter(&mut self, filter: PriorityFilter) {
        self.query.priority = filter;
        self.page = 1;
    }

    pub fn current_page(&self) -> Page<'_> {
        paginate(&self.query.apply(&self.tickets), self.page)
    }

    pub fn next_page(&mut self) -> bool {
        if !self.current_page().has_next {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Jumps straight to `number`, clamped to at least 1. Pages past the end
    /// render empty.
    pub fn go_to_page(&mut self, number: usize) {
        self.page = number.max(1);
    }

    /// Opens an edit session for `id`, replacing any session already open.
    pub fn open_edit(&mut self, id: &TicketId) -> bool {
        let Some(ticket) = self.tickets.iter().find(|ticket| &ticket.id == id) else {
            return false;
        };
        self.editing = Some(EditSession {
            id: ticket.id.clone(),
            working: ticket.fields(),
        });
        true
    }

    pub fn edit_field(&mut self, field: TicketField, value: &str) -> AppResult<()> {
        let session = self
            .editing
            .as_mut()
            .ok_or_else(|| AppError::Validation("no ticket is being edited".to_string()))?;
        session.working.set(field, value)
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editing.take().is_some()
    }

    pub async fn save_edit(&mut self, store: &dyn TicketStore) -> MutationOutcome {
        let Some(session) = self.editing.clone() else {
            return MutationOutcome::Cancelled;
        };
        let changes = TicketChanges::from(session.working);
        match store.update_by_id(&session.id, &changes).await {
            Ok(()) => {
                self.editing = None;
                self.fetch(store).await;
                MutationOutcome::Applied
            }
            Err(err) => {
                error!("Failed to update ticket {}: {err}", session.id);
                MutationOutcome::Failed
            }
        }
    }

    /// Marks the ticket resolved. Already-resolved tickets still get the
    /// update and the re-fetch.
    pub async fn resolve(&mut self, store: &dyn TicketStore, id: &TicketId) -> MutationOutcome {
        match store.update_by_id(id, &TicketChanges::resolve()).await {
            Ok(()) => {
                self.fetch(store).await;
                MutationOutcome::Applied
            }
            Err(err) => {
                error!("Failed to resolve ticket {id}: {err}");
                MutationOutcome::Failed
            }
        }
    }

    pub async fn delete(
        &mut self,
        store: &dyn TicketStore,
        id: &TicketId,
        confirm: &mut dyn Confirm,
    ) -> MutationOutcome {
        if !confirm.confirm(DELETE_PROMPT) {
            return MutationOutcome::Cancelled;
        }
        match store.delete_by_id(id).await {
            Ok(()) => {
                self.fetch(store).await;
                MutationOutcome::Applied
            }
            Err(err) => {
                error!("Failed to delete ticket {id}: {err}");
                MutationOutcome::Failed
            }
        }
    }
}
