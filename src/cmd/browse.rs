use std::io::{BufRead, Write};

use tracing::debug;

use crate::cmd::prompt::{self, PromptAction};
use crate::cmd::render::render_view;
use crate::domain::ticket::{TicketField, TicketId};
use crate::error::AppResult;
use crate::services::TicketStore;
use crate::workflow::filter::PriorityFilter;
use crate::workflow::form::{FormOutcome, TicketForm};
use crate::workflow::list::{MutationOutcome, TicketListView};

const HELP: &str = "\
Commands:
  search [TERM]          filter by title or email (empty clears)
  priority all|low|medium|high
  next | prev | page N   move between pages
  edit ID                start editing a ticket
  set FIELD VALUE        change a field of the ticket being edited
  save | cancel          finish editing
  resolve ID             mark a ticket resolved
  delete ID              delete a ticket (asks first)
  new                    submit a new ticket
  refresh                reload all tickets
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Priority(PriorityFilter),
    Next,
    Previous,
    Page(usize),
    Edit(TicketId),
    Set(TicketField, String),
    Save,
    Cancel,
    Resolve(TicketId),
    Delete(TicketId),
    New,
    Refresh,
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let id = |rest: &str| {
            if rest.is_empty() {
                Err(format!("usage: {verb} ID"))
            } else {
                Ok(TicketId::new(rest))
            }
        };

        match verb.to_lowercase().as_str() {
            "search" | "s" => Ok(BrowseCommand::Search(rest.to_string())),
            "priority" | "p" => PriorityFilter::from_str(rest)
                .map(BrowseCommand::Priority)
                .ok_or_else(|| "usage: priority all|low|medium|high".to_string()),
            "next" | "n" => Ok(BrowseCommand::Next),
            "prev" | "previous" => Ok(BrowseCommand::Previous),
            "page" => rest
                .parse::<usize>()
                .ok()
                .filter(|page| *page >= 1)
                .map(BrowseCommand::Page)
                .ok_or_else(|| "usage: page N (N >= 1)".to_string()),
            "edit" | "e" => id(rest).map(BrowseCommand::Edit),
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let field = TicketField::from_str(field).ok_or_else(|| {
                    "usage: set name|email|title|description|priority|status VALUE".to_string()
                })?;
                Ok(BrowseCommand::Set(field, value.trim().to_string()))
            }
            "save" => Ok(BrowseCommand::Save),
            "cancel" => Ok(BrowseCommand::Cancel),
            "resolve" | "r" => id(rest).map(BrowseCommand::Resolve),
            "delete" | "d" => id(rest).map(BrowseCommand::Delete),
            "new" => Ok(BrowseCommand::New),
            "refresh" => Ok(BrowseCommand::Refresh),
            "help" | "?" => Ok(BrowseCommand::Help),
            "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command '{other}'; type 'help'")),
        }
    }
}

/// Interactive session: the list view plus a creation form whose contents
/// survive a failed submission.
pub struct BrowseSession<'a> {
    store: &'a dyn TicketStore,
    view: TicketListView,
    form: TicketForm,
}

impl<'a> BrowseSession<'a> {
    pub fn new(store: &'a dyn TicketStore) -> Self {
        Self {
            store,
            view: TicketListView::new(),
            form: TicketForm::new(),
        }
    }

    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> AppResult<()> {
        self.view.fetch(self.store).await;

        loop {
            write!(out, "\n{}\n> ", render_view(&self.view))?;
            out.flush()?;

            let Some(line) = prompt::read_line(&mut input)? else {
                break;
            };
            let command = match BrowseCommand::parse(&line) {
                Ok(command) => command,
                Err(message) => {
                    if !message.is_empty() {
                        writeln!(out, "{message}")?;
                    }
                    continue;
                }
            };
            debug!(?command, "browse command");

            if command == BrowseCommand::Quit {
                break;
            }
            self.apply(command, &mut input, &mut out).await?;
        }
        Ok(())
    }

    async fn apply<R: BufRead, W: Write>(
        &mut self,
        command: BrowseCommand,
        input: &mut R,
        out: &mut W,
    ) -> AppResult<()> {
        match command {
            BrowseCommand::Search(term) => self.view.set_search(term),
            BrowseCommand::Priority(filter) => self.view.set_priority_filter(filter),
            BrowseCommand::Next => {
                if !self.view.next_page() {
                    writeln!(out, "Already on the last page.")?;
                }
            }
            BrowseCommand::Previous => {
                if !self.view.previous_page() {
                    writeln!(out, "Already on the first page.")?;
                }
            }
            BrowseCommand::Page(number) => self.view.go_to_page(number),
            BrowseCommand::Edit(id) => {
                if !self.view.open_edit(&id) {
                    writeln!(out, "No ticket with id {id}.")?;
                }
            }
            BrowseCommand::Set(field, value) => {
                if let Err(err) = self.view.edit_field(field, &value) {
                    writeln!(out, "{err}")?;
                }
            }
            BrowseCommand::Save => {
                if self.view.editing().is_none() {
                    writeln!(out, "No ticket is being edited.")?;
                } else {
                    self.view.save_edit(self.store).await;
                }
            }
            BrowseCommand::Cancel => {
                self.view.cancel_edit();
            }
            BrowseCommand::Resolve(id) => {
                self.view.resolve(self.store, &id).await;
            }
            BrowseCommand::Delete(id) => {
                let mut confirm =
                    |question: &str| prompt::confirm(&mut *input, &mut *out, question);
                if self.view.delete(self.store, &id, &mut confirm).await
                    == MutationOutcome::Cancelled
                {
                    writeln!(out, "Delete cancelled.")?;
                }
            }
            BrowseCommand::New => self.new_ticket(input, out).await?,
            BrowseCommand::Refresh => {
                self.view.fetch(self.store).await;
            }
            BrowseCommand::Help => writeln!(out, "{HELP}")?,
            BrowseCommand::Quit => {}
        }
        Ok(())
    }

    async fn new_ticket<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
    ) -> AppResult<()> {
        writeln!(out, "Submit a Support Ticket")?;
        let labels = [
            (TicketField::Name, "Your name"),
            (TicketField::Email, "Your email"),
            (TicketField::Title, "Issue title"),
            (TicketField::Description, "Describe your issue"),
            (TicketField::Priority, "Priority (Low/Medium/High)"),
        ];
        for (field, label) in labels {
            let current = current_value(&self.form, field);
            let shown = Some(current.as_str()).filter(|value| !value.is_empty());
            let result = match prompt::prompt(input, out, label, shown, false)? {
                PromptAction::Keep => Ok(()),
                PromptAction::Clear => self.form.set(field, ""),
                PromptAction::Set(value) => self.form.set(field, &value),
            };
            if let Err(err) = result {
                writeln!(out, "{err}")?;
            }
        }

        match self.form.submit(self.store).await {
            FormOutcome::Submitted(_) => {
                // Creation and listing share only the backend, so pull the new row in.
                self.view.fetch(self.store).await;
            }
            FormOutcome::Invalid(field) => {
                writeln!(out, "{} is required.", field.as_str())?;
                return Ok(());
            }
            FormOutcome::Failed | FormOutcome::AlreadyPending => {}
        }
        if let Some(message) = self.form.message() {
            writeln!(out, "{message}")?;
        }
        Ok(())
    }
}

fn current_value(form: &TicketForm, field: TicketField) -> String {
    let fields = form.fields();
    match field {
        TicketField::Name => fields.name.clone(),
        TicketField::Email => fields.email.clone(),
        TicketField::Title => fields.title.clone(),
        TicketField::Description => fields.description.clone(),
        TicketField::Priority => fields.priority.as_str().to_string(),
        TicketField::Status => fields.status.as_str().to_string(),
    }
}
