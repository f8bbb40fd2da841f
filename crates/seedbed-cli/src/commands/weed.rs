//! Weed command
//!
//! Usage: seedbed weed [--origin file|post|bundle]

use clap::Args;
use seedbed_core::SeedOrigin;
use seedbed_engine::commands::seeds::weed;

use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct WeedArgs {
    /// Only remove items seeded from this origin
    #[arg(long)]
    pub origin: Option<SeedOrigin>,
}

/// Execute weed command
pub fn execute(args: WeedArgs, settings: &Settings) -> anyhow::Result<()> {
    let mut conn = settings.open_db()?;
    let registry = settings.registry();

    let summary = weed(&mut conn, &registry, args.origin)?;

    println!("removed {} seeded item(s)", summary.removed());
    if summary.already_gone > 0 {
        println!("{} item(s) were already gone", summary.already_gone);
    }
    if summary.skipped > 0 {
        println!(
            "{} record(s) kept: importer type not registered",
            summary.skipped
        );
    }
    Ok(())
}
