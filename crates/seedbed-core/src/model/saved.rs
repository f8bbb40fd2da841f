use serde::{Deserialize, Serialize};

/// Whether a save created a new item or changed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Created,
    Updated,
}

/// What a save collaborator reports back for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    /// Identifier assigned by the persistence layer, if any
    pub id: Option<String>,
    /// Importer model identifier the row resolved to
    pub model: String,
    pub status: SaveStatus,
}

impl SavedItem {
    pub fn created(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            model: model.into(),
            status: SaveStatus::Created,
        }
    }

    pub fn updated(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            model: model.into(),
            status: SaveStatus::Updated,
        }
    }

    /// Non-empty identifier, if present
    pub fn item_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}
