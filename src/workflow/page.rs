use crate::domain::ticket::Ticket;

pub const PAGE_SIZE: usize = 5;

/// One page of the filtered collection. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub number: usize,
    pub rows: Vec<&'a Ticket>,
    pub total_matches: usize,
    pub page_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

pub fn page_count(total_matches: usize) -> usize {
    total_matches.div_ceil(PAGE_SIZE)
}

/// Slices `matches` for page `number`. Pages past the end come back empty.
pub fn paginate<'a>(matches: &[&'a Ticket], number: usize) -> Page<'a> {
    let number = number.max(1);
    let last = number.saturating_mul(PAGE_SIZE);
    let first = last.saturating_sub(PAGE_SIZE);

    let rows = matches
        .iter()
        .skip(first)
        .take(PAGE_SIZE)
        .copied()
        .collect();

    Page {
        number,
        rows,
        total_matches: matches.len(),
        page_count: page_count(matches.len()),
        has_previous: number > 1,
        has_next: last < matches.len(),
    }
}
