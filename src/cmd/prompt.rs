use std::io::{BufRead, Write};

use crate::error::AppResult;

pub enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

/// One line from `input` without its line ending; `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> AppResult<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    field: &str,
    current: Option<&str>,
    secret: bool,
) -> AppResult<PromptAction> {
    match (current, secret) {
        (Some(_), true) => write!(out, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => write!(out, "{field} [{value}] (Enter to keep, '-' to clear): ")?,
        (None, _) => write!(out, "{field} (Enter to skip): ")?,
    }
    out.flush()?;

    let line = read_line(input)?.unwrap_or_default();
    let trimmed = line.trim();

    if trimmed.is_empty() {
        Ok(PromptAction::Keep)
    } else if trimmed == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(trimmed.to_string()))
    }
}

/// Yes/no question defaulting to no. End of input or a read error counts as no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> bool {
    if write!(out, "{question} [y/N]: ").and_then(|_| out.flush()).is_err() {
        return false;
    }
    match read_line(input) {
        Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        _ => false,
    }
}
