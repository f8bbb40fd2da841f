//! Importers command
//!
//! Usage: seedbed importers list [--kind element|setting|field]

use anyhow::bail;
use clap::{Args, Subcommand};
use seedbed_core::{ImporterDescriptor, ImporterKind};

use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct ImportersArgs {
    #[command(subcommand)]
    pub command: ImportersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ImportersCommand {
    /// List registered importers by display name
    List {
        /// Only importers of this kind
        #[arg(long)]
        kind: Option<String>,
    },
}

/// Execute importers command
pub fn execute(args: ImportersArgs, settings: &Settings) -> anyhow::Result<()> {
    match args.command {
        ImportersCommand::List { kind } => {
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            let registry = settings.registry();

            let descriptors: Vec<&ImporterDescriptor> = match kind {
                Some(ImporterKind::Field) => registry.field_importers().collect(),
                Some(kind) => registry.list_all().filter(|d| d.kind == kind).collect(),
                None => registry
                    .list_all()
                    .chain(registry.field_importers())
                    .collect(),
            };

            for descriptor in descriptors {
                println!(
                    "{}\t{}\t{}{}",
                    descriptor.model,
                    descriptor.kind,
                    descriptor.name,
                    if descriptor.seed_capable { "\tseed" } else { "" }
                );
            }
            Ok(())
        }
    }
}

fn parse_kind(s: &str) -> anyhow::Result<ImporterKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "element" => Ok(ImporterKind::Element),
        "setting" => Ok(ImporterKind::Setting),
        "field" => Ok(ImporterKind::Field),
        other => bail!("unknown importer kind: {}", other),
    }
}
