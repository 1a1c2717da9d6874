use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use ofx_export::export;
use ofx_export::{ExportError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Export(args) => execute_export(args),
    }
}

fn execute_export(args: ExportArgs) -> Result<()> {
    for input in [&args.accounts, &args.transactions] {
        if !input.exists() {
            return Err(ExportError::MissingInput(input.clone()));
        }
    }

    match args.generated_at {
        Some(generated_at) => export::snapshot_to_ofx_at(
            &args.accounts,
            &args.transactions,
            &args.output,
            generated_at.naive_utc(),
        ),
        None => export::snapshot_to_ofx(&args.accounts, &args.transactions, &args.output),
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| ExportError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn aggregator account snapshots into OFX statements."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a snapshot pair as a single OFX document.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Accounts snapshot XML file.
    #[arg(long)]
    accounts: PathBuf,

    /// Transactions snapshot XML file.
    #[arg(long)]
    transactions: PathBuf,

    /// Output OFX file path.
    #[arg(long)]
    output: PathBuf,

    /// Generation timestamp override (RFC 3339); defaults to the current time.
    #[arg(long)]
    generated_at: Option<DateTime<Utc>>,
}
