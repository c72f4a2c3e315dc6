use async_trait::async_trait;

use crate::domain::ticket::{Ticket, TicketChanges, TicketFields, TicketId};
use crate::error::AppResult;

/// Query API over the one record collection holding all tickets.
///
/// Each call is a single request/response round trip; implementations do not
/// retry, batch or cache.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn select_all(&self) -> AppResult<Vec<Ticket>>;
    async fn insert_one(&self, fields: &TicketFields) -> AppResult<Ticket>;
    async fn update_by_id(&self, id: &TicketId, changes: &TicketChanges) -> AppResult<()>;
    async fn delete_by_id(&self, id: &TicketId) -> AppResult<()>;
}
