//! Seedbed Core - importer resolution, job batching and dispatch
//!
//! This crate holds the import pipeline that does not depend on storage:
//! - Importer types and the registry that resolves rows to them
//! - JSON validation and job preparation from text, uploads and bundles
//! - Row dispatch to element/setting savers with seed (weed) tracking
//! - The error facility and structured logging shared by every crate
//!
//! Persistence, queueing and diagnostics are collaborator traits; see
//! [`collaborators`]. [`memory`] has in-memory implementations.

pub mod collaborators;
pub mod dispatcher;
pub mod errors;
pub mod importers;
pub mod job_builder;
pub mod logging_facility;
pub mod memory;
pub mod model;
pub mod validator;

pub use seedbed_core_types as types;

#[doc(hidden)]
pub use tracing as __tracing;

// Re-export commonly used types
pub use collaborators::{
    DiagnosticsSink, ElementSaver, JobQueue, SeedTracker, SettingSaver, TracingSink,
};
pub use dispatcher::{DispatchReport, ImportDispatcher, RowOutcome};
pub use errors::{ErrorBag, ErrorClass, ExError, ExErrorKind, ImportError, Result};
pub use importers::{
    Capabilities, HostEnvironment, Importer, ImporterDescriptor, ImporterKind,
    ImporterRegistration, ImporterRegistry, ImporterType,
};
pub use job_builder::{ImportJobBuilder, ImportJobs, UploadedFile};
pub use model::{Job, Payload, Row, SaveStatus, SavedItem, SeedContext, SeedOrigin, Weed};
pub use validator::{PayloadValidator, ValidatedPayload};
