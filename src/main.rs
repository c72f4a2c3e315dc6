mod cmd;
mod config;
mod context;
mod domain;
mod drafts;
mod error;
mod infra;
mod services;
mod workflow;

use std::io;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cmd::browse::BrowseSession;
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::list::{self as list_cmd, ListArgs};
use crate::cmd::submit::{self as submit_cmd, SubmitArgs};
use crate::cmd::ticket::{self as ticket_cmd, EditArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::ticket::TicketId;
use crate::error::AppResult;
use crate::infra::supabase::SupabaseClient;

const DEFAULT_LOG_FILTER: &str = "helpdesk=warn";

#[derive(Parser)]
#[command(name = "helpdesk", author, version, about = "Support ticket desk")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new support ticket.
    Submit(SubmitArgs),
    /// Search, filter and page through tickets.
    List(ListArgs),
    /// Browse and manage tickets interactively.
    Browse,
    /// Edit fields of an existing ticket.
    Edit {
        id: String,
        #[command(flatten)]
        args: EditArgs,
    },
    /// Mark a ticket resolved.
    Resolve { id: String },
    /// Delete a ticket.
    Delete {
        id: String,
        /// Skip the confirmation question.
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    if let Commands::Config(args) = cli.command {
        return config_cmd::run(args.command);
    }

    let config = AppConfig::load()?;
    let store = Arc::new(SupabaseClient::new(config.backend.clone()));
    let context = AppContext::new(config, store);

    match cli.command {
        Commands::Submit(args) => {
            let ticket = submit_cmd::run(&context, args).await?;
            println!("Ticket {} created.", ticket.id);
            Ok(())
        }
        Commands::List(args) => {
            print!("{}", list_cmd::run(&context, args).await?);
            Ok(())
        }
        Commands::Browse => {
            let stdin = io::stdin();
            let mut session = BrowseSession::new(context.store.as_ref());
            session.run(stdin.lock(), io::stdout()).await
        }
        Commands::Edit { id, args } => ticket_cmd::edit(&context, TicketId::new(id), args).await,
        Commands::Resolve { id } => ticket_cmd::resolve(&context, TicketId::new(id)).await,
        Commands::Delete { id, yes } => {
            ticket_cmd::delete(&context, TicketId::new(id), yes).await
        }
        Commands::Config(_) => Ok(()),
    }
}
