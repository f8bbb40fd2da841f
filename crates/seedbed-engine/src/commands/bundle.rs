//! Install-bundle command.
//!
//! A bundle is a directory shipping import schema files and, optionally,
//! templates for the site front end:
//!
//! ```text
//! starter-blog/
//!   schema/      *.json import payloads, walked recursively
//!   templates/   copied verbatim to the template destination
//! ```
//!
//! Templates are installed first. Every schema file then becomes one job
//! with origin `bundle` and the bundle name as seed details.
//!
//! ## Logging Ownership
//!
//! `install_bundle` logs its lifecycle; the template installers and schema
//! enumeration log only `tracing::debug!` details.

#![allow(clippy::result_large_err)]

use std::fs;
use std::path::{Path, PathBuf};

use seedbed_core::errors::{ErrorBag, ExError, ExErrorKind, Result};
use seedbed_core::{log_op_end, log_op_error, log_op_start};
use seedbed_core::{ImportJobBuilder, JobQueue};
use seedbed_core_types::{JobId, RequestContext, RequestId};
use walkdir::WalkDir;

use crate::commands::import::submit_jobs;
use crate::notice::Notice;

const SCHEMA_DIR: &str = "schema";
const TEMPLATES_DIR: &str = "templates";

/// A packaged set of schema files and templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    name: String,
    schema_dir: PathBuf,
    templates_dir: Option<PathBuf>,
}

impl Bundle {
    pub fn new(name: impl Into<String>, schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            schema_dir: schema_dir.into(),
            templates_dir: None,
        }
    }

    pub fn with_templates(mut self, templates_dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(templates_dir.into());
        self
    }

    /// Read a bundle laid out as `<root>/schema` and `<root>/templates`
    ///
    /// The bundle is named after `root`. A missing `templates` directory is
    /// allowed; a missing `schema` directory is not.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let schema_dir = root.join(SCHEMA_DIR);
        if !schema_dir.is_dir() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("bundle_from_dir")
                .with_file(root.display().to_string())
                .with_message("Bundle has no schema directory"));
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let bundle = Self::new(name, schema_dir);
        let templates_dir = root.join(TEMPLATES_DIR);
        Ok(if templates_dir.is_dir() {
            bundle.with_templates(templates_dir)
        } else {
            bundle
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    pub fn templates_dir(&self) -> Option<&Path> {
        self.templates_dir.as_deref()
    }

    /// Every `.json` file under the schema directory, sorted by path
    pub fn schema_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.schema_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(&self.schema_dir, e))?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some("json")
            {
                files.push(path.to_path_buf());
            }
        }
        tracing::debug!(
            bundle = %self.name,
            files_len = files.len(),
            "Bundle schema files enumerated"
        );
        Ok(files)
    }
}

/// Puts a bundle's templates where the site can serve them
pub trait TemplateInstaller {
    /// Install the templates of `bundle`, returning the number of files written
    fn install(&self, bundle: &Bundle) -> Result<usize>;
}

/// Copies template trees into a destination directory
///
/// Existing files with the same relative path are overwritten.
#[derive(Debug, Clone)]
pub struct FsTemplateInstaller {
    destination: PathBuf,
}

impl FsTemplateInstaller {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl TemplateInstaller for FsTemplateInstaller {
    fn install(&self, bundle: &Bundle) -> Result<usize> {
        let Some(source) = bundle.templates_dir() else {
            return Ok(0);
        };

        let mut copied = 0;
        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(source, e))?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| ExError::new(ExErrorKind::Internal).with_message(e.to_string()))?;
            let target = self.destination.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| copy_error(&target, e))?;
            } else if entry.file_type().is_file() {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| copy_error(parent, e))?;
                }
                fs::copy(entry.path(), &target).map_err(|e| copy_error(&target, e))?;
                copied += 1;
            }
        }

        tracing::debug!(
            bundle = %bundle.name(),
            destination = %self.destination.display(),
            copied,
            "Bundle templates installed"
        );
        Ok(copied)
    }
}

/// Installer for hosts that serve no templates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTemplates;

impl TemplateInstaller for NoTemplates {
    fn install(&self, _bundle: &Bundle) -> Result<usize> {
        Ok(0)
    }
}

/// What an install-bundle call achieved
#[derive(Debug)]
pub struct BundleInstall {
    pub request_id: RequestId,
    pub templates_copied: usize,
    pub queued: Vec<JobId>,
    pub errors: ErrorBag,
    pub notice: Notice,
}

impl BundleInstall {
    pub fn is_success(&self) -> bool {
        self.notice.is_success()
    }
}

/// Install templates and queue one job per schema file of `bundle`
///
/// Template and enumeration failures abort the call with an error. Invalid
/// schema files and queue rejections are reported in the returned
/// [`BundleInstall`].
pub fn install_bundle(
    bundle: &Bundle,
    seed: bool,
    installer: &dyn TemplateInstaller,
    queue: &dyn JobQueue,
) -> Result<BundleInstall> {
    let ctx = RequestContext::new();
    log_op_start!(
        "install_bundle",
        request_id = %ctx.request_id,
        bundle = bundle.name(),
        seed = seed
    );
    let start = std::time::Instant::now();

    let result = install_bundle_impl(ctx, bundle, seed, installer, queue).map_err(|e| {
        log_op_error!(
            "install_bundle",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "install_bundle",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %result.request_id,
        templates_copied = result.templates_copied,
        queued = result.queued.len(),
        errors = result.errors.len()
    );

    Ok(result)
}

fn install_bundle_impl(
    ctx: RequestContext,
    bundle: &Bundle,
    seed: bool,
    installer: &dyn TemplateInstaller,
    queue: &dyn JobQueue,
) -> Result<BundleInstall> {
    let request_id = ctx.request_id.clone();

    let templates_copied = installer.install(bundle)?;
    let files = bundle.schema_files()?;

    let mut builder = ImportJobBuilder::new(ctx).with_seed_details(bundle.name());
    builder.from_bundle_files(&files, seed);
    let prepared = builder.finish();

    if !prepared.has_jobs() {
        return Ok(BundleInstall {
            request_id,
            templates_copied,
            queued: Vec::new(),
            errors: prepared.errors,
            notice: Notice::BundleFailed,
        });
    }

    let mut errors = prepared.errors;
    let submitted = prepared.jobs.len();
    let queued = submit_jobs(prepared.jobs, queue, &mut errors);
    let notice = if queued.len() == submitted {
        Notice::BundleImporting
    } else {
        Notice::BundleFailed
    };

    Ok(BundleInstall {
        request_id,
        templates_copied,
        queued,
        errors,
        notice,
    })
}

fn walk_error(root: &Path, err: walkdir::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op("install_bundle")
        .with_file(root.display().to_string())
        .with_message(err.to_string())
}

fn copy_error(path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op("install_templates")
        .with_file(path.display().to_string())
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_dir_requires_schema() {
        let dir = TempDir::new().unwrap();
        let err = Bundle::from_dir(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_schema_files_are_sorted_json_only() {
        let dir = TempDir::new().unwrap();
        let schema = dir.path().join("schema");
        fs::create_dir_all(schema.join("nested")).unwrap();
        fs::write(schema.join("b.json"), "[]").unwrap();
        fs::write(schema.join("a.json"), "[]").unwrap();
        fs::write(schema.join("nested").join("c.json"), "[]").unwrap();
        fs::write(schema.join("README.md"), "docs").unwrap();

        let bundle = Bundle::from_dir(dir.path()).unwrap();
        let names: Vec<String> = bundle
            .schema_files()
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(&schema).unwrap().display().to_string())
            .collect();

        assert_eq!(names.len(), 3);
        assert_eq!(names[0], "a.json");
        assert_eq!(names[1], "b.json");
        assert!(names[2].ends_with("c.json"));
        assert!(bundle.templates_dir().is_none());
    }

    #[test]
    fn test_no_templates_installer_copies_nothing() {
        let bundle = Bundle::new("empty", "/nonexistent");
        assert_eq!(NoTemplates.install(&bundle).unwrap(), 0);
    }
}
