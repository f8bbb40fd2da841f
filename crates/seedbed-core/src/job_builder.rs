//! Turning raw inputs into import jobs
//!
//! One [`ImportJobBuilder`] serves one preparation call. Each entry point
//! appends to the same job list and error bag; [`ImportJobBuilder::finish`]
//! hands both back. Callers judge success by whether any job was produced.
//!
//! File inputs fail fast: the first unreadable or invalid file is recorded
//! and the remaining files of that call are not examined.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use seedbed_core_types::RequestContext;
use tempfile::{NamedTempFile, TempDir};

use crate::errors::{ErrorBag, ExError, ExErrorKind, ImportError};
use crate::model::{Job, Payload, SeedContext, SeedOrigin};
use crate::validator::PayloadValidator;

/// A file handed over by the upload transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-side file name
    pub name: String,
    /// Where the transport left the uploaded bytes
    pub path: PathBuf,
    /// Error reported by the transport, if the upload failed
    pub error: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            error: None,
        }
    }

    /// An upload the transport reported as failed
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: PathBuf::new(),
            error: Some(error.into()),
        }
    }
}

/// Jobs and errors produced by one preparation call
#[derive(Debug, Default)]
pub struct ImportJobs {
    pub jobs: Vec<Job>,
    pub errors: ErrorBag,
}

impl ImportJobs {
    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }
}

/// Accumulates validated jobs from pasted text, uploads and bundle files
#[derive(Debug)]
pub struct ImportJobBuilder {
    ctx: RequestContext,
    validator: PayloadValidator,
    staging_root: Option<PathBuf>,
    seed_details: Option<String>,
    jobs: Vec<Job>,
    errors: ErrorBag,
}

impl ImportJobBuilder {
    pub fn new(ctx: RequestContext) -> Self {
        Self {
            ctx,
            validator: PayloadValidator::new(),
            staging_root: None,
            seed_details: None,
            jobs: Vec::new(),
            errors: ErrorBag::new(),
        }
    }

    /// Stage uploads under `root` instead of the system temp directory
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Details attached to the seed context of every job built from here on
    pub fn with_seed_details(mut self, details: impl Into<String>) -> Self {
        self.seed_details = Some(details.into());
        self
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    /// Build a job from text pasted into the import form
    ///
    /// Empty text is ignored. Anything else is validated, so whitespace-only
    /// or invalid text records one `json` error.
    pub fn from_posted_payload(&mut self, text: &str, seed_enabled: bool) -> &mut Self {
        if text.is_empty() {
            return self;
        }

        let seed = self.seed_context(SeedOrigin::Post, seed_enabled);
        match self.validator.validate(text) {
            Ok(validated) => self.push_job(Payload::Decoded(validated.value), seed),
            Err(err) => self.record(ExError::from(err).with_op("from_posted_payload")),
        }
        self
    }

    /// Build one job per uploaded file, in order
    ///
    /// Each upload is copied into a staging directory scoped to this call,
    /// read back, validated, and released once its job exists. The staging
    /// directory is removed when the call returns, on every path.
    pub fn from_uploaded_files(&mut self, files: &[UploadedFile], seed_enabled: bool) -> &mut Self {
        if files.is_empty() {
            return self;
        }

        let staging = match self.staging_dir() {
            Ok(dir) => dir,
            Err(err) => {
                self.record(err.with_op("from_uploaded_files"));
                return self;
            }
        };
        let seed = self.seed_context(SeedOrigin::File, seed_enabled);

        for file in files {
            if let Some(reason) = &file.error {
                self.record(
                    ExError::from(ImportError::UploadFailed {
                        file: file.name.clone(),
                        reason: reason.clone(),
                    })
                    .with_op("from_uploaded_files"),
                );
                break;
            }

            let content = match stage_and_read(staging.path(), &file.path) {
                Ok(content) => content,
                Err(reason) => {
                    self.record(
                        ExError::from(ImportError::FileUnreadable {
                            path: file.name.clone(),
                            reason,
                        })
                        .with_op("from_uploaded_files"),
                    );
                    break;
                }
            };

            match self.validator.validate(content) {
                Ok(validated) => self.push_job(Payload::Decoded(validated.value), seed.clone()),
                Err(err) => {
                    self.record(
                        ExError::from(err)
                            .with_op("from_uploaded_files")
                            .with_file(file.name.clone()),
                    );
                    break;
                }
            }
        }

        tracing::debug!(
            staging = %staging.path().display(),
            "Releasing upload staging directory"
        );
        self
    }

    /// Build one job per bundle schema file, in order
    pub fn from_bundle_files<P: AsRef<Path>>(&mut self, paths: &[P], seed_enabled: bool) -> &mut Self {
        if paths.is_empty() {
            return self;
        }

        let seed = self.seed_context(SeedOrigin::Bundle, seed_enabled);
        for path in paths {
            let path = path.as_ref();
            let display = path.display().to_string();

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    self.record(
                        ExError::from(ImportError::FileUnreadable {
                            path: display,
                            reason: e.to_string(),
                        })
                        .with_op("from_bundle_files"),
                    );
                    break;
                }
            };

            match self.validator.validate(content) {
                Ok(validated) => self.push_job(Payload::Decoded(validated.value), seed.clone()),
                Err(err) => {
                    self.record(
                        ExError::from(err)
                            .with_op("from_bundle_files")
                            .with_file(display),
                    );
                    break;
                }
            }
        }
        self
    }

    /// Hand back everything accumulated so far
    pub fn finish(self) -> ImportJobs {
        ImportJobs {
            jobs: self.jobs,
            errors: self.errors,
        }
    }

    fn seed_context(&self, origin: SeedOrigin, enabled: bool) -> SeedContext {
        let seed = SeedContext::new(origin, enabled);
        match &self.seed_details {
            Some(details) => seed.with_details(details.clone()),
            None => seed,
        }
    }

    fn push_job(&mut self, payload: Payload, seed: SeedContext) {
        let job = Job::new(payload, seed).with_request_id(self.ctx.request_id.clone());
        tracing::debug!(
            job_id = %job.id,
            request_id = %self.ctx.request_id,
            origin = %job.seed.origin(),
            "Import job prepared"
        );
        self.jobs.push(job);
    }

    fn record(&mut self, err: ExError) {
        let err = err.with_request_id(self.ctx.request_id.clone());
        tracing::warn!(
            request_id = %self.ctx.request_id,
            err.code = err.code(),
            error = %err,
            "Import preparation error"
        );
        self.errors.push(err);
    }

    fn staging_dir(&self) -> crate::errors::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("seedbed-upload-");
        let dir = match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_message(format!("Cannot create staging directory: {}", e))
        })
    }
}

/// Copy `source` into a scoped file under `staging` and read it back
///
/// The staged copy is deleted when this returns.
fn stage_and_read(staging: &Path, source: &Path) -> std::result::Result<String, String> {
    let mut input = fs::File::open(source).map_err(|e| e.to_string())?;
    let mut staged = NamedTempFile::new_in(staging).map_err(|e| e.to_string())?;
    std::io::copy(&mut input, staged.as_file_mut()).map_err(|e| e.to_string())?;

    let file = staged.as_file_mut();
    file.seek(SeekFrom::Start(0)).map_err(|e| e.to_string())?;
    let mut content = String::new();
    file.read_to_string(&mut content).map_err(|e| e.to_string())?;
    Ok(content)
}
