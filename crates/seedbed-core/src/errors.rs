use seedbed_core_types::{JobId, RequestId};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in logs, in the aggregate
/// error collection handed back to callers, and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Preparation-scoped validation
    InvalidInput,
    MalformedPayload,
    UploadFailed,
    FileUnreadable,

    // Row-scoped resolution
    MissingModelKey,
    UnknownModel,
    NotSavable,
    MalformedRow,

    // Queue
    QueueRejected,

    // Persistence collaborators
    SaveFailed,
    NotFound,
    Io,
    Serialization,
    Persistence,
    ChecksumMismatch,

    // Internal
    Internal,
}

/// Coarse classification of errors
///
/// Decides how far a failure propagates: validation failures abort the rest
/// of the current preparation call, row resolution failures skip one row,
/// queue failures stop submission of the current batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    RowResolution,
    QueueSubmission,
    Persistence,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MalformedPayload => "ERR_MALFORMED_PAYLOAD",
            ExErrorKind::UploadFailed => "ERR_UPLOAD_FAILED",
            ExErrorKind::FileUnreadable => "ERR_FILE_UNREADABLE",
            ExErrorKind::MissingModelKey => "ERR_MISSING_MODEL_KEY",
            ExErrorKind::UnknownModel => "ERR_UNKNOWN_MODEL",
            ExErrorKind::NotSavable => "ERR_NOT_SAVABLE",
            ExErrorKind::MalformedRow => "ERR_MALFORMED_ROW",
            ExErrorKind::QueueRejected => "ERR_QUEUE_REJECTED",
            ExErrorKind::SaveFailed => "ERR_SAVE_FAILED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Classify this kind
    pub fn class(&self) -> ErrorClass {
        match self {
            ExErrorKind::InvalidInput
            | ExErrorKind::MalformedPayload
            | ExErrorKind::UploadFailed
            | ExErrorKind::FileUnreadable => ErrorClass::Validation,
            ExErrorKind::MissingModelKey
            | ExErrorKind::UnknownModel
            | ExErrorKind::NotSavable
            | ExErrorKind::MalformedRow => ErrorClass::RowResolution,
            ExErrorKind::QueueRejected => ErrorClass::QueueSubmission,
            ExErrorKind::SaveFailed
            | ExErrorKind::NotFound
            | ExErrorKind::Io
            | ExErrorKind::Serialization
            | ExErrorKind::Persistence
            | ExErrorKind::ChecksumMismatch => ErrorClass::Persistence,
            ExErrorKind::Internal => ErrorClass::Internal,
        }
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    model: Option<String>,
    row_index: Option<usize>,
    item_id: Option<String>,
    file: Option<String>,
    request_id: Option<RequestId>,
    job_id: Option<JobId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            model: None,
            row_index: None,
            item_id: None,
            file: None,
            request_id: None,
            job_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the importer model identifier involved
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add the zero-based position of the row within its payload
    pub fn with_row_index(mut self, index: usize) -> Self {
        self.row_index = Some(index);
        self
    }

    /// Add persisted item context
    pub fn with_item_id(mut self, id: impl Into<String>) -> Self {
        self.item_id = Some(id.into());
        self
    }

    /// Add file name or path context
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add job ID context
    pub fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn row_index(&self) -> Option<usize> {
        self.row_index
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(model) = &self.model {
            write!(f, " (model: {})", model)?;
        }
        if let Some(index) = self.row_index {
            write!(f, " (row: {})", index)?;
        }
        if let Some(file) = &self.file {
            write!(f, " (file: {})", file)?;
        }
        if let Some(item_id) = &self.item_id {
            write!(f, " (item_id: {})", item_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised while preparing and dispatching imports
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    /// Content is not well-formed JSON
    #[error("Invalid JSON: {reason}")]
    MalformedPayload { reason: String },

    /// Decoded payload is not a list of rows
    #[error("Import data must be a JSON object or an array of objects, found {found}")]
    UnexpectedPayloadShape { found: String },

    /// A row is not a JSON object
    #[error("Row must be a JSON object, found {found}")]
    MalformedRow { found: String },

    /// Row lacks the reserved importer key
    #[error(
        "Importer class not found. Each item being imported requires an \"@model\" attribute."
    )]
    MissingModelKey,

    /// Row names an importer that is not registered
    #[error("Importer defined in @model attribute could not be found: {model}")]
    UnknownModel { model: String },

    /// Row names a field importer, which only describes field values
    #[error("Field importer {model} cannot be saved directly")]
    NotSavable { model: String },

    /// The upload transport reported an error for a file
    #[error("Upload of {file} failed: {reason}")]
    UploadFailed { file: String, reason: String },

    /// A file could not be read
    #[error("Unable to import file: {path}")]
    FileUnreadable { path: String, reason: String },

    /// The job queue refused a job
    #[error("Unable to queue job: {reason}")]
    QueueRejected { reason: String },

    /// A save collaborator reported failure
    #[error("Cannot save {model}: {reason}")]
    SaveFailed { model: String, reason: String },
}

impl From<ImportError> for ExError {
    fn from(err: ImportError) -> Self {
        let message = err.to_string();
        match err {
            ImportError::MalformedPayload { .. } | ImportError::UnexpectedPayloadShape { .. } => {
                ExError::new(ExErrorKind::MalformedPayload).with_message(message)
            }
            ImportError::MalformedRow { .. } => {
                ExError::new(ExErrorKind::MalformedRow).with_message(message)
            }
            ImportError::MissingModelKey => {
                ExError::new(ExErrorKind::MissingModelKey).with_message(message)
            }
            ImportError::UnknownModel { model } => ExError::new(ExErrorKind::UnknownModel)
                .with_model(model)
                .with_message(message),
            ImportError::NotSavable { model } => ExError::new(ExErrorKind::NotSavable)
                .with_model(model)
                .with_message(message),
            ImportError::UploadFailed { file, reason } => ExError::new(ExErrorKind::UploadFailed)
                .with_file(file)
                .with_message(reason),
            ImportError::FileUnreadable { path, reason } => {
                ExError::new(ExErrorKind::FileUnreadable)
                    .with_file(path)
                    .with_message(format!("{}: {}", message, reason))
            }
            ImportError::QueueRejected { .. } => {
                ExError::new(ExErrorKind::QueueRejected).with_message(message)
            }
            ImportError::SaveFailed { model, .. } => ExError::new(ExErrorKind::SaveFailed)
                .with_model(model)
                .with_message(message),
        }
    }
}

/// Key under which an error is filed in an [`ErrorBag`]
pub fn error_key(kind: ExErrorKind) -> &'static str {
    match kind {
        ExErrorKind::MalformedPayload | ExErrorKind::InvalidInput => "json",
        ExErrorKind::UploadFailed | ExErrorKind::FileUnreadable => "file",
        ExErrorKind::MissingModelKey | ExErrorKind::MalformedRow => "invalid-model-key",
        ExErrorKind::UnknownModel | ExErrorKind::NotSavable => "invalid-model",
        ExErrorKind::QueueRejected => "queue",
        ExErrorKind::SaveFailed | ExErrorKind::NotFound => "save",
        ExErrorKind::Io
        | ExErrorKind::Serialization
        | ExErrorKind::Persistence
        | ExErrorKind::ChecksumMismatch
        | ExErrorKind::Internal => "internal",
    }
}

/// Ordered aggregate of errors collected during one call
///
/// Errors are kept in the order they occurred, each filed under a short key
/// (`json`, `file`, `queue`, ...) for user-facing reporting.
#[derive(Debug, Clone, Default)]
pub struct ErrorBag {
    entries: Vec<(String, ExError)>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// File an error under the key derived from its kind
    pub fn push(&mut self, err: ExError) {
        let key = error_key(err.kind());
        self.entries.push((key.to_string(), err));
    }

    /// File an error under an explicit key
    pub fn add(&mut self, key: impl Into<String>, err: ExError) {
        self.entries.push((key.into(), err));
    }

    pub fn extend(&mut self, other: ErrorBag) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First error filed under `key`
    pub fn first(&self, key: &str) -> Option<&ExError> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// All errors filed under `key`, in order
    pub fn get(&self, key: &str) -> Vec<&ExError> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExError)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Errors without their keys, in order
    pub fn errors(&self) -> Vec<&ExError> {
        self.entries.iter().map(|(_, e)| e).collect()
    }

    pub fn into_errors(self) -> Vec<ExError> {
        self.entries.into_iter().map(|(_, e)| e).collect()
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::MalformedPayload {
            reason: err.to_string(),
        }
    }
}
