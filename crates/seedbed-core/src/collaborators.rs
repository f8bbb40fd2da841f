//! Collaborator traits the import core delegates to
//!
//! The core never persists anything itself. Saving items, recording weeds,
//! queueing jobs and surfacing diagnostics are injected behind these traits;
//! `seedbed-store` provides SQLite implementations and [`crate::memory`]
//! provides in-memory ones.

use crate::errors::{ErrorBag, Result};
use crate::importers::Importer;
use crate::model::{Job, SavedItem, Weed};
use seedbed_core_types::JobId;

/// Persists element importers
pub trait ElementSaver {
    /// Save the element described by `importer`
    ///
    /// Reports whether the item was created or updated an existing one.
    fn save_element(&self, importer: &Importer) -> Result<SavedItem>;
}

/// Persists setting importers
pub trait SettingSaver {
    fn save_setting(&self, importer: &Importer) -> Result<SavedItem>;
}

/// Append-only sink for weed records
pub trait SeedTracker {
    fn track_seed(&self, weed: &Weed) -> Result<()>;
}

/// Deferred execution of import jobs
pub trait JobQueue {
    /// Enqueue `job`, returning its identifier
    fn push(&self, job: &Job) -> Result<JobId>;
}

/// Receives the errors of one dispatch call
pub trait DiagnosticsSink {
    fn record(&self, errors: &ErrorBag);
}

/// Sink that writes each error as an `error` level event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, errors: &ErrorBag) {
        for (key, err) in errors.iter() {
            tracing::error!(
                key = key,
                err.code = err.code(),
                model = err.model(),
                row_index = err.row_index(),
                error = %err,
                "Import error"
            );
        }
    }
}
