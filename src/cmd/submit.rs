use std::io::{self, BufRead, Write};

use clap::Args;
use tracing::warn;

use crate::cmd::prompt::{PromptAction, prompt};
use crate::context::AppContext;
use crate::domain::ticket::{Priority, Ticket, TicketField};
use crate::drafts::DraftStore;
use crate::error::{AppError, AppResult};
use crate::workflow::form::{FAILURE_MESSAGE, FormOutcome, TicketForm};

#[derive(Args, Debug, Clone, Default)]
pub struct SubmitArgs {
    /// Your name.
    #[arg(long)]
    pub name: Option<String>,
    /// Your email.
    #[arg(long)]
    pub email: Option<String>,
    /// Issue title.
    #[arg(long)]
    pub title: Option<String>,
    /// Describe your issue.
    #[arg(long)]
    pub description: Option<String>,
    /// Low, Medium or High.
    #[arg(long, value_parser = parse_priority, default_value = "Low")]
    pub priority: Priority,
    /// Resubmit the most recent draft that failed to submit.
    #[arg(long, conflicts_with_all = ["name", "email", "title", "description"])]
    pub retry: bool,
}

pub fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::from_str(value).ok_or_else(|| format!("expected Low, Medium or High, got '{value}'"))
}

pub async fn run(ctx: &AppContext, args: SubmitArgs) -> AppResult<Ticket> {
    let mut drafts = DraftStore::load(&ctx.config.config_dir)?;

    let (mut form, retried_key) = if args.retry {
        let (key, fields) = drafts
            .latest()
            .ok_or_else(|| AppError::Validation("no saved draft to retry".to_string()))?;
        (TicketForm::from_fields(fields), Some(key))
    } else {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        (form_from_args(&args, &mut input, &mut out)?, None)
    };

    let key = form.fingerprint();
    let fields = form.fields().clone();

    match form.submit(ctx.store.as_ref()).await {
        FormOutcome::Submitted(ticket) => {
            if let Some(message) = form.message() {
                println!("{message}");
            }
            if let Some(retried) = retried_key {
                drafts.remove(&retried);
                drafts.save()?;
            }
            Ok(ticket)
        }
        FormOutcome::Failed => {
            drafts.insert(key, &fields);
            if let Err(err) = drafts.save() {
                warn!("could not save draft: {err}");
            } else {
                eprintln!("Your ticket was kept; retry with `helpdesk submit --retry`.");
            }
            Err(AppError::Backend(FAILURE_MESSAGE.to_string()))
        }
        FormOutcome::Invalid(field) => Err(AppError::Validation(format!(
            "{} is required",
            field.as_str()
        ))),
        FormOutcome::AlreadyPending => Err(AppError::Validation(
            "this ticket is already being submitted".to_string(),
        )),
    }
}

/// Fills the form from flags, asking on `input` for any text field left out.
pub fn form_from_args<R: BufRead, W: Write>(
    args: &SubmitArgs,
    input: &mut R,
    out: &mut W,
) -> AppResult<TicketForm> {
    let mut form = TicketForm::new();
    let provided = [
        (TicketField::Name, "Your name", &args.name),
        (TicketField::Email, "Your email", &args.email),
        (TicketField::Title, "Issue title", &args.title),
        (TicketField::Description, "Describe your issue", &args.description),
    ];

    for (field, label, value) in provided {
        match value {
            Some(value) => form.set(field, value)?,
            None => {
                if let PromptAction::Set(value) = prompt(input, out, label, None, false)? {
                    form.set(field, &value)?;
                }
            }
        }
    }
    form.set(TicketField::Priority, args.priority.as_str())?;
    Ok(form)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn prompts_only_for_missing_fields() {
        let args = SubmitArgs {
            name: Some("Ada".to_string()),
            email: Some("ada@corp.com".to_string()),
            title: None,
            description: Some("Every hour".to_string()),
            priority: Priority::High,
            retry: false,
        };
        let mut input = Cursor::new("VPN drops\n");
        let mut out = Vec::new();

        let form = form_from_args(&args, &mut input, &mut out).unwrap();
        assert_eq!(form.fields().title, "VPN drops");
        assert_eq!(form.fields().priority, Priority::High);
        assert_eq!(form.missing_field(), None);

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Issue title"));
        assert!(!shown.contains("Your name"));
    }

    #[test]
    fn skipped_prompt_leaves_field_missing() {
        let args = SubmitArgs::default();
        let mut input = Cursor::new("Ada\n\n\n\n");
        let mut out = Vec::new();

        let form = form_from_args(&args, &mut input, &mut out).unwrap();
        assert_eq!(form.missing_field(), Some(TicketField::Email));
    }

    #[test]
    fn parses_priority_flag() {
        assert_eq!(parse_priority("medium"), Ok(Priority::Medium));
        assert!(parse_priority("urgent").is_err());
    }
}
