use std::fmt;

use crate::domain::ticket::{Priority, Ticket};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn from_str(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(PriorityFilter::All);
        }
        Priority::from_str(value).map(PriorityFilter::Only)
    }

    pub fn admits(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(wanted) => *wanted == priority,
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("All Priorities"),
            PriorityFilter::Only(priority) => write!(f, "{priority}"),
        }
    }
}

/// Priority filter plus free-text search over title and email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    pub priority: PriorityFilter,
    pub search: String,
}

impl TicketQuery {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if !self.priority.admits(ticket.priority) {
            return false;
        }
        let needle = self.search.to_lowercase();
        ticket.title.to_lowercase().contains(&needle)
            || ticket.email.to_lowercase().contains(&needle)
    }

    /// Matching tickets in collection order.
    pub fn apply<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets.iter().filter(|ticket| self.matches(ticket)).collect()
    }
}
