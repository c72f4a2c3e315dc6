use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use crate::cmd::prompt::{PromptAction, prompt};
use crate::config::{DEFAULT_TABLE, StoredConfig, config_file_path};
use crate::error::AppResult;
use crate::infra::key_claims::{inspect_key, key_warnings};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    println!("Configuring helpdesk.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Use the project's public (anon) key; it is stored in plain text in the local config file.");
    println!();

    apply_prompt(
        &mut input,
        &mut out,
        "Backend URL (e.g., https://<project>.supabase.co)",
        &mut cfg.backend_url,
        false,
    )?;
    apply_prompt(&mut input, &mut out, "Public API key", &mut cfg.api_key, true)?;
    apply_prompt(
        &mut input,
        &mut out,
        &format!("Ticket table (default {DEFAULT_TABLE})"),
        &mut cfg.table,
        false,
    )?;

    cfg.save()?;

    if let Some(key) = &cfg.api_key {
        for warning in key_warnings(cfg.backend_url.as_deref(), key) {
            println!("Warning: {warning}");
        }
    }

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Backend URL: {}", display_value(&cfg.backend_url));
    println!("Public API key: {}", mask_secret(&cfg.api_key));
    println!(
        "Ticket table: {}",
        cfg.table.as_deref().unwrap_or(DEFAULT_TABLE)
    );

    if let Some(claims) = cfg.api_key.as_deref().and_then(inspect_key) {
        println!(
            "Key role: {}",
            claims.role.as_deref().unwrap_or("<unknown>")
        );
        println!(
            "Key project: {}",
            claims.project_ref.as_deref().unwrap_or("<unknown>")
        );
    }
    if let Some(key) = &cfg.api_key {
        for warning in key_warnings(cfg.backend_url.as_deref(), key) {
            println!("Warning: {warning}");
        }
    }

    Ok(())
}

fn apply_prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    field: &str,
    target: &mut Option<String>,
    secret: bool,
) -> AppResult<()> {
    match prompt(input, out, field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
