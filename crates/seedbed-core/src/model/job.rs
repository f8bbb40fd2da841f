use seedbed_core_types::{JobId, RequestId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::row::json_type_name;
use super::seed::SeedContext;
use crate::errors::ImportError;

/// Import data carried by a job
///
/// Preparation always produces `Decoded`; `Encoded` is accepted so callers
/// holding raw text (older queue entries, embedding code) can dispatch it
/// without parsing it themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Encoded(String),
    Decoded(Value),
}

impl Payload {
    /// True for blank text, JSON null and an empty array
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Encoded(text) => text.trim().is_empty(),
            Payload::Decoded(Value::Null) => true,
            Payload::Decoded(Value::Array(items)) => items.is_empty(),
            Payload::Decoded(_) => false,
        }
    }

    /// Decode into a list of raw row values
    ///
    /// Text is parsed exactly once here. A top-level object is a single row;
    /// a top-level array is a list of rows; anything else is rejected.
    pub fn into_values(self) -> Result<Vec<Value>, ImportError> {
        let value = match self {
            Payload::Encoded(text) => serde_json::from_str(&text)?,
            Payload::Decoded(value) => value,
        };

        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items),
            Value::Object(_) => Ok(vec![value]),
            other => Err(ImportError::UnexpectedPayloadShape {
                found: json_type_name(&other).to_string(),
            }),
        }
    }
}

/// One unit of deferred import work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Preparation call that produced this job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    pub payload: Payload,
    pub seed: SeedContext,
}

impl Job {
    pub fn new(payload: Payload, seed: SeedContext) -> Self {
        Self {
            id: JobId::new(),
            request_id: None,
            payload,
            seed,
        }
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }
}
