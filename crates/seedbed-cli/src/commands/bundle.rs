//! Bundle command
//!
//! Usage: seedbed bundle install <DIR> [--templates-dest D] [--seed]

use anyhow::bail;
use clap::{Args, Subcommand};
use seedbed_engine::commands::bundle::{
    install_bundle, Bundle, FsTemplateInstaller, NoTemplates, TemplateInstaller,
};
use seedbed_store::SqliteJobQueue;
use std::path::PathBuf;

use crate::commands::print_errors;
use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct BundleArgs {
    #[command(subcommand)]
    pub command: BundleCommand,
}

#[derive(Debug, Subcommand)]
pub enum BundleCommand {
    /// Install a bundle's templates and queue its schema files
    Install(InstallArgs),
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Bundle directory containing schema/ and optionally templates/
    pub dir: PathBuf,

    /// Where to copy the bundle's templates; skipped when omitted
    #[arg(long)]
    pub templates_dest: Option<PathBuf>,

    /// Track created items so they can be weeded later
    #[arg(long)]
    pub seed: bool,
}

/// Execute bundle command
pub fn execute(args: BundleArgs, settings: &Settings) -> anyhow::Result<()> {
    match args.command {
        BundleCommand::Install(install_args) => execute_install(install_args, settings),
    }
}

fn execute_install(args: InstallArgs, settings: &Settings) -> anyhow::Result<()> {
    let bundle = Bundle::from_dir(&args.dir)?;
    let conn = settings.open_db()?;
    let queue = SqliteJobQueue::new(&conn);

    let installer: Box<dyn TemplateInstaller> = match args.templates_dest {
        Some(dest) => Box::new(FsTemplateInstaller::new(dest)),
        None => Box::new(NoTemplates),
    };

    let result = install_bundle(&bundle, args.seed, installer.as_ref(), &queue)?;

    if result.templates_copied > 0 {
        println!("copied {} template file(s)", result.templates_copied);
    }
    for job_id in &result.queued {
        println!("queued {}", job_id);
    }
    print_errors(&result.errors);

    if !result.is_success() {
        bail!("{}", result.notice);
    }
    println!("{}", result.notice);
    Ok(())
}
