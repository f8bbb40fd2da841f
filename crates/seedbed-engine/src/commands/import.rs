//! Run-import command: pasted text and uploaded files to queued jobs.
//!
//! Uploaded files are prepared before the pasted text, so their jobs come
//! first. Preparation errors do not stop the jobs that were prepared; a queue
//! failure stops submission of the remaining jobs but does not withdraw the
//! ones already queued.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for imports:
//! - `log_op_start!` at entry
//! - `log_op_end!` when at least one job was queued
//! - `log_op_error!` when nothing could be queued
//!
//! Job preparation in core logs only `tracing::debug!`/`warn!` details.

use std::path::PathBuf;

use seedbed_core::{log_op_end, log_op_error, log_op_start};
use seedbed_core::{ErrorBag, ImportJobBuilder, Job, JobQueue, UploadedFile};
use seedbed_core_types::{JobId, RequestContext, RequestId};

use crate::notice::Notice;

/// Inputs of one run-import call
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    /// Text pasted into the import form
    pub text: Option<String>,
    pub files: Vec<UploadedFile>,
    /// Record created items in the seed ledger
    pub seed: bool,
    /// Where uploads are staged; the system temp directory if unset
    pub staging_root: Option<PathBuf>,
}

impl ImportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn seeded(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }
}

/// What a run-import call achieved
#[derive(Debug)]
pub struct ImportOutcome {
    pub request_id: RequestId,
    /// Identifiers of the jobs that reached the queue, in order
    pub queued: Vec<JobId>,
    pub errors: ErrorBag,
    pub notice: Notice,
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        self.notice.is_success()
    }
}

/// Prepare and queue the jobs of one import request
pub fn run_import(request: ImportRequest, queue: &dyn JobQueue) -> ImportOutcome {
    let ctx = RequestContext::new();
    log_op_start!(
        "run_import",
        request_id = %ctx.request_id,
        files = request.files.len(),
        seed = request.seed
    );
    let start = std::time::Instant::now();

    let outcome = run_import_impl(ctx, request, queue);

    match outcome.errors.errors().first() {
        Some(err) if !outcome.is_success() => {
            log_op_error!(
                "run_import",
                (*err).clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %outcome.request_id,
                errors = outcome.errors.len()
            );
        }
        _ => {
            log_op_end!(
                "run_import",
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %outcome.request_id,
                queued = outcome.queued.len(),
                errors = outcome.errors.len()
            );
        }
    }

    outcome
}

fn run_import_impl(
    ctx: RequestContext,
    request: ImportRequest,
    queue: &dyn JobQueue,
) -> ImportOutcome {
    let request_id = ctx.request_id.clone();

    let mut builder = ImportJobBuilder::new(ctx);
    if let Some(root) = request.staging_root {
        builder = builder.with_staging_root(root);
    }
    builder.from_uploaded_files(&request.files, request.seed);
    if let Some(text) = &request.text {
        builder.from_posted_payload(text, request.seed);
    }
    let prepared = builder.finish();

    if !prepared.has_jobs() {
        return ImportOutcome {
            request_id,
            queued: Vec::new(),
            errors: prepared.errors,
            notice: Notice::ImportFailed,
        };
    }

    let mut errors = prepared.errors;
    let submitted = prepared.jobs.len();
    let queued = submit_jobs(prepared.jobs, queue, &mut errors);
    let notice = if queued.len() == submitted {
        Notice::Queued(queued.len())
    } else {
        Notice::ImportFailed
    };

    ImportOutcome {
        request_id,
        queued,
        errors,
        notice,
    }
}

/// Push `jobs` in order, stopping at the first rejection
///
/// The rejection is filed under `queue`. Jobs pushed before it stay queued.
pub(crate) fn submit_jobs(jobs: Vec<Job>, queue: &dyn JobQueue, errors: &mut ErrorBag) -> Vec<JobId> {
    let mut queued = Vec::with_capacity(jobs.len());
    for job in jobs {
        match queue.push(&job) {
            Ok(job_id) => {
                tracing::debug!(job_id = %job_id, "Import job queued");
                queued.push(job_id);
            }
            Err(err) => {
                let err = match job.request_id {
                    Some(request_id) => err.with_request_id(request_id),
                    None => err,
                };
                tracing::warn!(
                    job_id = %job.id,
                    err.code = err.code(),
                    error = %err,
                    "Queue refused import job"
                );
                errors.add("queue", err);
                break;
            }
        }
    }
    queued
}
