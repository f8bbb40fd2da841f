//! Import command
//!
//! Usage: seedbed import [--file F]... [--text T] [--seed]

use anyhow::bail;
use clap::Args;
use seedbed_core::UploadedFile;
use seedbed_engine::commands::import::{run_import, ImportRequest};
use seedbed_store::SqliteJobQueue;
use std::path::PathBuf;

use crate::commands::print_errors;
use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file to import; repeat for several files
    #[arg(long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// JSON text to import
    #[arg(long)]
    pub text: Option<String>,

    /// Track created items so they can be weeded later
    #[arg(long)]
    pub seed: bool,
}

/// Execute import command
pub fn execute(args: ImportArgs, settings: &Settings) -> anyhow::Result<()> {
    let conn = settings.open_db()?;
    let queue = SqliteJobQueue::new(&conn);

    let mut request = ImportRequest::new().seeded(args.seed);
    if let Some(dir) = &settings.staging_dir {
        std::fs::create_dir_all(dir)?;
        request = request.with_staging_root(dir);
    }
    for path in args.files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        request = request.with_file(UploadedFile::new(name, path));
    }
    if let Some(text) = args.text {
        request = request.with_text(text);
    }

    let outcome = run_import(request, &queue);

    for job_id in &outcome.queued {
        println!("queued {}", job_id);
    }
    print_errors(&outcome.errors);

    if !outcome.is_success() {
        bail!("{}", outcome.notice);
    }
    println!("{}", outcome.notice);
    Ok(())
}
