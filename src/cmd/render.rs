use std::fmt::Write as _;

use chrono::Local;

use crate::domain::ticket::{Status, Ticket};
use crate::workflow::list::{EditSession, RowMode, TicketListView, ViewState};

pub fn render_view(view: &TicketListView) -> String {
    let mut out = String::new();
    let query = view.query();
    let search = if query.search.is_empty() {
        "<none>".to_string()
    } else {
        format!("'{}'", query.search)
    };
    let _ = writeln!(out, "Ticket Management");
    let _ = writeln!(out, "Filter: {} | Search: {search}", query.priority);
    let _ = writeln!(out);

    if view.state() == ViewState::Loading {
        let _ = writeln!(out, "Loading...");
        return out;
    }
    if view.tickets().is_empty() {
        let _ = writeln!(out, "No tickets submitted yet.");
        return out;
    }

    let page = view.current_page();
    if page.rows.is_empty() {
        let _ = writeln!(out, "No tickets match.");
    }
    for ticket in &page.rows {
        match (view.row_mode(&ticket.id), view.editing()) {
            (RowMode::Editing, Some(session)) => render_editing(&mut out, session),
            _ => render_card(&mut out, ticket),
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "{} | Page {} of {} ({} matching) | {}",
        pager_button("Previous", page.has_previous),
        page.number,
        page.page_count.max(1),
        page.total_matches,
        pager_button("Next", page.has_next),
    );
    out
}

fn render_card(out: &mut String, ticket: &Ticket) {
    let created = ticket
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let _ = writeln!(out, "#{} {} ({})", ticket.id, ticket.title, ticket.priority);
    let _ = writeln!(out, "    {}", ticket.description);
    let _ = writeln!(out, "    By {} ({})", ticket.name, ticket.email);
    let _ = writeln!(out, "    Status: {} | {created}", ticket.status);

    let actions = if ticket.status == Status::Resolved {
        "edit, delete"
    } else {
        "resolve, edit, delete"
    };
    let _ = writeln!(out, "    Actions: {actions}");
}

fn render_editing(out: &mut String, session: &EditSession) {
    let working = &session.working;
    let _ = writeln!(out, "#{} (editing)", session.id);
    let _ = writeln!(out, "    name: {}", working.name);
    let _ = writeln!(out, "    email: {}", working.email);
    let _ = writeln!(out, "    title: {}", working.title);
    let _ = writeln!(out, "    description: {}", working.description);
    let _ = writeln!(out, "    priority: {}", working.priority);
    let _ = writeln!(out, "    status: {}", working.status);
    let _ = writeln!(out, "    Actions: set <field> <value>, save, cancel");
}

fn pager_button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[{label}]")
    } else {
        format!("({label})")
    }
}
