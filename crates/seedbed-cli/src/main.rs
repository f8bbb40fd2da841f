//! Seedbed CLI
//!
//! Command-line interface for queueing imports, running the queue worker
//! and managing the seed ledger.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod settings;

use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "seedbed")]
#[command(about = "Seedbed - JSON content imports with seed tracking", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./seedbed.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Queue import jobs from files and pasted text
    Import(commands::import::ImportArgs),
    /// Bundle operations
    Bundle(commands::bundle::BundleArgs),
    /// Job queue operations
    Queue(commands::queue::QueueArgs),
    /// Seed ledger operations
    Seeds(commands::seeds::SeedsArgs),
    /// Remove every seeded item
    Weed(commands::weed::WeedArgs),
    /// Importer registry operations
    Importers(commands::importers::ImportersArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref(), cli.db)?;
    seedbed_core::logging_facility::init(settings.profile()?);
    tracing::debug!(
        database = %settings.database_path.display(),
        capabilities = ?settings.capabilities,
        "Settings loaded"
    );

    match cli.command {
        Commands::Import(args) => commands::import::execute(args, &settings),
        Commands::Bundle(args) => commands::bundle::execute(args, &settings),
        Commands::Queue(args) => commands::queue::execute(args, &settings),
        Commands::Seeds(args) => commands::seeds::execute(args, &settings),
        Commands::Weed(args) => commands::weed::execute(args, &settings),
        Commands::Importers(args) => commands::importers::execute(args, &settings),
    }
}
