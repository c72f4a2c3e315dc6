use std::io;

use clap::Args;

use crate::cmd::list::load_view;
use crate::cmd::prompt;
use crate::cmd::submit::parse_priority;
use crate::context::AppContext;
use crate::domain::ticket::{Priority, Status, TicketField, TicketId};
use crate::error::{AppError, AppResult};
use crate::workflow::list::{MutationOutcome, TicketListView};

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<Status>,
}

impl EditArgs {
    fn changes(&self) -> Vec<(TicketField, String)> {
        let text = [
            (TicketField::Name, &self.name),
            (TicketField::Email, &self.email),
            (TicketField::Title, &self.title),
            (TicketField::Description, &self.description),
        ];
        let mut changes: Vec<(TicketField, String)> = text
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|value| (field, value)))
            .collect();
        if let Some(priority) = self.priority {
            changes.push((TicketField::Priority, priority.as_str().to_string()));
        }
        if let Some(status) = self.status {
            changes.push((TicketField::Status, status.as_str().to_string()));
        }
        changes
    }
}

pub fn parse_status(value: &str) -> Result<Status, String> {
    Status::from_str(value).ok_or_else(|| format!("expected Open or Resolved, got '{value}'"))
}

async fn view_with(ctx: &AppContext, id: &TicketId) -> AppResult<TicketListView> {
    let view = load_view(ctx).await?;
    if !view.tickets().iter().any(|ticket| &ticket.id == id) {
        return Err(AppError::Validation(format!("no ticket with id {id}")));
    }
    Ok(view)
}

fn expect_applied(outcome: MutationOutcome, action: &str, id: &TicketId) -> AppResult<()> {
    match outcome {
        MutationOutcome::Applied => {
            println!("Ticket {id} {action}.");
            Ok(())
        }
        MutationOutcome::Cancelled => {
            println!("Ticket {id} was not {action}.");
            Ok(())
        }
        MutationOutcome::Failed => Err(AppError::Backend(format!(
            "ticket {id} could not be {action}"
        ))),
    }
}

pub async fn resolve(ctx: &AppContext, id: TicketId) -> AppResult<()> {
    let mut view = view_with(ctx, &id).await?;
    let outcome = view.resolve(ctx.store.as_ref(), &id).await;
    expect_applied(outcome, "resolved", &id)
}

pub async fn delete(ctx: &AppContext, id: TicketId, assume_yes: bool) -> AppResult<()> {
    let mut view = view_with(ctx, &id).await?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let mut confirm =
        |question: &str| assume_yes || prompt::confirm(&mut input, &mut out, question);

    let outcome = view.delete(ctx.store.as_ref(), &id, &mut confirm).await;
    expect_applied(outcome, "deleted", &id)
}

pub async fn edit(ctx: &AppContext, id: TicketId, args: EditArgs) -> AppResult<()> {
    let changes = args.changes();
    if changes.is_empty() {
        return Err(AppError::Validation(
            "nothing to change; pass at least one field flag".to_string(),
        ));
    }

    let mut view = view_with(ctx, &id).await?;
    view.open_edit(&id);
    for (field, value) in &changes {
        view.edit_field(*field, value)?;
    }
    let outcome = view.save_edit(ctx.store.as_ref()).await;
    expect_applied(outcome, "updated", &id)
}
