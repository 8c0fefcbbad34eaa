//! CLI entry point for Herald.
//!
//! A thin host around the dispatch core: `herald run` reads commands from
//! stdin in a loop, `herald exec` dispatches a single command.  The binary
//! owns tracing initialization and configuration loading; everything
//! intent-related lives in the library crates.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use herald_handlers::{OsaBackend, ScriptBackend, ScriptedBackend, standard_handlers};
use herald_kernel::Dispatcher;

mod config;

use config::Config;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Herald — a natural-language command bar for your Mac.
#[derive(Parser)]
#[command(
    name = "herald",
    version,
    about = "Herald — natural-language commands for messages, calendars, and the web",
    long_about = "Type one line, get one action: send an iMessage, run a raw AppleScript, \
                  create a calendar event, list today's availabilities, or fall back to \
                  opening a URL / web search."
)]
struct Cli {
    /// Path to a TOML configuration file (default: herald.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin and dispatch each line.
    Run,

    /// Dispatch a single command and exit.
    Exec {
        /// The command text (joined with spaces).
        text: Vec<String>,

        /// Print the generated script(s) instead of executing them.
        #[arg(long)]
        dry_run: bool,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => cmd_run(&config).await,
        Commands::Exec {
            text,
            dry_run,
            json,
        } => cmd_exec(&config, &text.join(" "), dry_run, json).await,
    }
}

/// Initialize the tracing subscriber with the given default log level.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Build the dispatcher over the canonical handler chain.
fn dispatcher(config: &Config, backend: Arc<dyn ScriptBackend>) -> Dispatcher {
    Dispatcher::new(standard_handlers(&config.handler_config(), backend))
}

// ---------------------------------------------------------------------------
// Subcommand: run
// ---------------------------------------------------------------------------

async fn cmd_run(config: &Config) -> Result<()> {
    info!(calendar = %config.calendar, "starting herald");

    let backend: Arc<dyn ScriptBackend> =
        Arc::new(OsaBackend::new().with_timeout(config.backend_timeout_secs));
    let dispatcher = dispatcher(config, backend);

    println!();
    println!("  herald v{}", env!("CARGO_PKG_VERSION"));
    println!("  Type a command, or 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            info!("user requested exit");
            break;
        }

        let outcome = dispatcher.dispatch(trimmed).await;
        if outcome.is_error {
            eprintln!("error: {}", outcome.message);
        } else if !outcome.message.is_empty() {
            println!("{}", outcome.message);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: exec
// ---------------------------------------------------------------------------

async fn cmd_exec(config: &Config, text: &str, dry_run: bool, json: bool) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("no command text given");
    }

    if dry_run {
        // A scripted backend swallows execution and records the blocks the
        // handlers generated.
        let scripted = Arc::new(ScriptedBackend::new());
        let dispatcher = dispatcher(config, Arc::clone(&scripted) as Arc<dyn ScriptBackend>);

        let outcome = dispatcher.dispatch(text.trim()).await;
        for script in scripted.scripts() {
            println!("{script}");
            println!("--");
        }
        if outcome.is_error {
            eprintln!("error: {}", outcome.message);
        }
        return Ok(());
    }

    let backend: Arc<dyn ScriptBackend> =
        Arc::new(OsaBackend::new().with_timeout(config.backend_timeout_secs));
    let dispatcher = dispatcher(config, backend);
    let outcome = dispatcher.dispatch(text.trim()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.is_error {
        eprintln!("error: {}", outcome.message);
        std::process::exit(1);
    }
    if !outcome.message.is_empty() {
        println!("{}", outcome.message);
    }
    Ok(())
}
