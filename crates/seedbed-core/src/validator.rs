//! JSON validation for import content

use serde_json::Value;

use crate::errors::ImportError;

/// Content that parsed as JSON, with the decoded value kept alongside
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    pub text: String,
    pub value: Value,
}

/// Checks that a text blob is well-formed JSON
///
/// Validation is syntactic only; the shape of the decoded value is checked
/// when the job runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadValidator;

impl PayloadValidator {
    pub fn new() -> Self {
        Self
    }

    /// Parse `text`, returning the decoded value on success
    ///
    /// # Errors
    ///
    /// `MalformedPayload` with the parser's message if `text` is not JSON.
    pub fn validate(&self, text: impl Into<String>) -> Result<ValidatedPayload, ImportError> {
        let text = text.into();
        let value: Value = serde_json::from_str(&text)?;
        Ok(ValidatedPayload { text, value })
    }

    /// Whether `text` is well-formed JSON
    pub fn is_valid(&self, text: &str) -> bool {
        serde_json::from_str::<Value>(text).is_ok()
    }
}
