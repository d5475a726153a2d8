//! CSXS ledger command-line tool
//!
//! Constructs a ledger from a TOML config and replays scripted operations
//! against it, printing events and the final state as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use csxs_cli::{LedgerSummary, Script};
use csxs_ledger::{Address, LedgerConfig, TokenLedger};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "csxs")]
#[command(about = "CSXS token ledger operator tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ledger config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Construct a ledger and print its initial state
    Init {
        /// Creator and initial owner
        #[arg(long)]
        creator: Address,
    },

    /// Replay a script of operations
    Run {
        /// Script file
        #[arg(short, long)]
        script: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    match path {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading ledger config {}", path.display())),
        None => Ok(LedgerConfig::default()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { creator } => {
            let ledger = TokenLedger::with_config(creator, config)?;
            print_json(&LedgerSummary::capture(&ledger))?;
        }

        Commands::Run { script } => {
            let script = Script::load(&script)?;
            let ledger = TokenLedger::with_config(script.creator()?, config)?;

            let outcomes = script.run(&ledger);
            let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
            for outcome in &outcomes {
                print_json(outcome)?;
            }
            info!(steps = outcomes.len(), failed, "script finished");

            let summary = LedgerSummary::capture(&ledger);
            print_json(&summary)?;
            if !summary.audit.is_balanced() {
                bail!(
                    "supply audit failed: balances sum to {} of {}",
                    summary.audit.circulating,
                    summary.audit.total_supply
                );
            }
        }
    }

    Ok(())
}
