use serde::Serialize;
use std::sync::Arc;

use crate::model::Row;

/// The closed set of importer kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImporterKind {
    /// Produces a content entity; saved through the element path
    Element,
    /// Produces a configuration object; saved through the setting path
    Setting,
    /// Describes how a field type's values are imported; never saved directly
    Field,
}

impl ImporterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImporterKind::Element => "element",
            ImporterKind::Setting => "setting",
            ImporterKind::Field => "field",
        }
    }
}

impl std::fmt::Display for ImporterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform description of an importer type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImporterDescriptor {
    /// Display name, used for ordering
    pub name: String,
    /// Canonical model identifier, the value rows put under `@model`
    pub model: String,
    pub kind: ImporterKind,
    /// Whether the importer can generate seed data
    pub seed_capable: bool,
}

impl ImporterDescriptor {
    pub fn new(name: impl Into<String>, model: impl Into<String>, kind: ImporterKind) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            kind,
            seed_capable: false,
        }
    }

    pub fn seed_capable(mut self) -> Self {
        self.seed_capable = true;
        self
    }
}

/// Constructor registered for an importer type
///
/// Receives the row with `@model` already removed.
pub type ImporterCtor = fn(Arc<ImporterDescriptor>, Row) -> Importer;

/// An allow-listed importer type: descriptor plus constructor
#[derive(Debug, Clone)]
pub struct ImporterType {
    descriptor: Arc<ImporterDescriptor>,
    ctor: ImporterCtor,
}

impl ImporterType {
    /// Type using the default constructor
    pub fn new(descriptor: ImporterDescriptor) -> Self {
        Self::with_ctor(descriptor, Importer::new)
    }

    pub fn with_ctor(descriptor: ImporterDescriptor, ctor: ImporterCtor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            ctor,
        }
    }

    pub fn descriptor(&self) -> &ImporterDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn model(&self) -> &str {
        &self.descriptor.model
    }

    pub fn kind(&self) -> ImporterKind {
        self.descriptor.kind
    }

    /// Build a fresh importer instance configured with `settings`
    pub fn instantiate(&self, settings: Row) -> Importer {
        (self.ctor)(Arc::clone(&self.descriptor), settings)
    }
}

/// One importer instance, configured from a single row
#[derive(Debug, Clone)]
pub struct Importer {
    descriptor: Arc<ImporterDescriptor>,
    settings: Row,
}

impl Importer {
    pub fn new(descriptor: Arc<ImporterDescriptor>, settings: Row) -> Self {
        Self {
            descriptor,
            settings,
        }
    }

    pub fn descriptor(&self) -> &ImporterDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn model(&self) -> &str {
        &self.descriptor.model
    }

    pub fn kind(&self) -> ImporterKind {
        self.descriptor.kind
    }

    /// The row's fields without the reserved key
    pub fn settings(&self) -> &Row {
        &self.settings
    }
}
