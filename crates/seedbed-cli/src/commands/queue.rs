//! Queue command
//!
//! Usage:
//!   seedbed queue run [--limit N]
//!   seedbed queue status

use clap::{Args, Subcommand};
use seedbed_engine::commands::worker::run_pending;
use seedbed_store::SqliteJobQueue;

use crate::commands::print_errors;
use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Run pending import jobs
    Run {
        /// Maximum number of jobs to run (defaults to worker_batch_size)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show job counts by status
    Status,
}

/// Execute queue command
pub fn execute(args: QueueArgs, settings: &Settings) -> anyhow::Result<()> {
    match args.command {
        QueueCommand::Run { limit } => execute_run(limit, settings),
        QueueCommand::Status => execute_status(settings),
    }
}

fn execute_run(limit: Option<usize>, settings: &Settings) -> anyhow::Result<()> {
    let conn = settings.open_db()?;
    let registry = settings.registry();
    let limit = limit.unwrap_or(settings.worker_batch_size);

    let summary = run_pending(&conn, &registry, limit)?;

    for run in &summary.runs {
        println!(
            "{} {} saved={} failed={} tracked={}",
            run.job_id,
            run.status.as_str(),
            run.saved,
            run.failed,
            run.tracked
        );
        print_errors(&run.errors);
    }
    println!(
        "{} job(s) run: {} completed, {} failed",
        summary.jobs_run(),
        summary.completed(),
        summary.failed()
    );
    Ok(())
}

fn execute_status(settings: &Settings) -> anyhow::Result<()> {
    let conn = settings.open_db()?;
    let counts = SqliteJobQueue::new(&conn).counts()?;

    println!("pending: {}", counts.pending);
    println!("running: {}", counts.running);
    println!("completed: {}", counts.completed);
    println!("failed: {}", counts.failed);
    Ok(())
}
