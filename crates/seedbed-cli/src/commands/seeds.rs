//! Seeds command
//!
//! Usage: seedbed seeds list [--origin file|post|bundle]

use clap::{Args, Subcommand};
use seedbed_core::SeedOrigin;
use seedbed_engine::commands::seeds::list_seeds;

use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct SeedsArgs {
    #[command(subcommand)]
    pub command: SeedsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedsCommand {
    /// List tracked items in the order they were seeded
    List {
        /// Only items seeded from this origin
        #[arg(long)]
        origin: Option<SeedOrigin>,
    },
}

/// Execute seeds command
pub fn execute(args: SeedsArgs, settings: &Settings) -> anyhow::Result<()> {
    match args.command {
        SeedsCommand::List { origin } => {
            let conn = settings.open_db()?;
            let weeds = list_seeds(&conn, origin)?;

            for weed in &weeds {
                println!(
                    "{}\t{}\t{}\t{}",
                    weed.importer_type,
                    weed.item_id,
                    weed.seed_origin,
                    weed.details.as_deref().unwrap_or("-")
                );
            }
            println!("{} seeded item(s)", weeds.len());
            Ok(())
        }
    }
}
