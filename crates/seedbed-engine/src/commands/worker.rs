//! Queue worker: executes pending import jobs.
//!
//! Jobs are claimed oldest first and dispatched one at a time against the
//! SQLite stores. A job whose rows all failed is marked `failed`; any job
//! that saved at least one row, or had nothing to save, is `completed`.
//! Row errors are kept in the returned summary and in the job's event
//! metadata. A job the queue cannot decode is already failed when claimed;
//! it is reported and the drain moves on.
//!
//! ## Logging Ownership
//!
//! `run_pending` logs the lifecycle of the drain and of every job it runs.

#![allow(clippy::result_large_err)]

use rusqlite::Connection;
use seedbed_core::{log_op_end, log_op_error, log_op_start};
use seedbed_core::{
    DispatchReport, ErrorBag, ExError, ImportDispatcher, ImporterRegistry, Result,
};
use seedbed_core_types::JobId;
use seedbed_store::{Claim, JobStatus, SqliteImportStore, SqliteJobQueue};
use serde_json::json;

/// Result of executing one job
#[derive(Debug, Clone)]
pub struct JobRun {
    pub job_id: JobId,
    pub status: JobStatus,
    pub saved: usize,
    pub failed: usize,
    pub tracked: usize,
    pub errors: ErrorBag,
}

impl JobRun {
    /// A job the queue could not decode; nothing was dispatched
    fn rejected(job_id: JobId, error: ExError) -> Self {
        let mut errors = ErrorBag::new();
        errors.push(error);
        Self {
            job_id,
            status: JobStatus::Failed,
            saved: 0,
            failed: 0,
            tracked: 0,
            errors,
        }
    }
}

/// Result of one worker drain
#[derive(Debug, Clone, Default)]
pub struct WorkerSummary {
    pub runs: Vec<JobRun>,
}

impl WorkerSummary {
    pub fn jobs_run(&self) -> usize {
        self.runs.len()
    }

    pub fn completed(&self) -> usize {
        self.count(JobStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(JobStatus::Failed)
    }

    /// Rows saved across every job
    pub fn rows_saved(&self) -> usize {
        self.runs.iter().map(|run| run.saved).sum()
    }

    pub fn rows_failed(&self) -> usize {
        self.runs.iter().map(|run| run.failed).sum()
    }

    fn count(&self, status: JobStatus) -> usize {
        self.runs.iter().filter(|run| run.status == status).count()
    }
}

/// Run up to `limit` pending jobs
///
/// Stops early when the queue is empty. Errors are returned only for queue
/// or database failures; row failures are reported per job.
pub fn run_pending(
    conn: &Connection,
    registry: &ImporterRegistry,
    limit: usize,
) -> Result<WorkerSummary> {
    log_op_start!("run_pending", limit = limit);
    let start = std::time::Instant::now();

    let result = run_pending_impl(conn, registry, limit).map_err(|e| {
        log_op_error!(
            "run_pending",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "run_pending",
        duration_ms = start.elapsed().as_millis() as u64,
        jobs_run = result.jobs_run(),
        completed = result.completed(),
        failed = result.failed()
    );

    Ok(result)
}

fn run_pending_impl(
    conn: &Connection,
    registry: &ImporterRegistry,
    limit: usize,
) -> Result<WorkerSummary> {
    let queue = SqliteJobQueue::new(conn);
    let store = SqliteImportStore::new(conn);
    let dispatcher = ImportDispatcher::with_store(registry, &store);

    let mut summary = WorkerSummary::default();
    while summary.jobs_run() < limit {
        let Some(claim) = queue.claim_next()? else {
            break;
        };
        let job_id = claim.job_id().clone();

        log_op_start!("dispatch_job", job_id = %job_id);
        let start = std::time::Instant::now();

        let job = match claim {
            Claim::Ready(job) => job,
            Claim::Rejected { job_id, error } => {
                log_op_error!(
                    "dispatch_job",
                    error.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    job_id = %job_id
                );
                summary.runs.push(JobRun::rejected(job_id, error));
                continue;
            }
        };

        let report = dispatcher.run_job(job);
        let run = settle(&queue, job_id, report)?;

        match (run.status, run.errors.errors().first()) {
            (JobStatus::Failed, Some(err)) => {
                log_op_error!(
                    "dispatch_job",
                    (*err).clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    job_id = %run.job_id
                );
            }
            _ => {
                log_op_end!(
                    "dispatch_job",
                    duration_ms = start.elapsed().as_millis() as u64,
                    job_id = %run.job_id,
                    saved = run.saved,
                    failed = run.failed,
                    tracked = run.tracked
                );
            }
        }

        summary.runs.push(run);
    }

    Ok(summary)
}

/// Record the final state of a dispatched job in the queue
fn settle(queue: &SqliteJobQueue<'_>, job_id: JobId, report: DispatchReport) -> Result<JobRun> {
    let saved = report.saved_count();
    let failed = report.failed_count();
    let tracked = report.tracked_count();
    let metadata = json!({
        "saved": saved,
        "failed": failed,
        "tracked": tracked,
        "errors": report.errors.len(),
    });

    let status = match report.errors.errors().first() {
        Some(err) if saved == 0 => {
            queue.fail(&job_id, &err.to_string(), metadata)?;
            JobStatus::Failed
        }
        _ => {
            queue.complete(&job_id, metadata)?;
            JobStatus::Completed
        }
    };

    Ok(JobRun {
        job_id,
        status,
        saved,
        failed,
        tracked,
        errors: report.errors,
    })
}
