use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::builtin::builtin_types;
use super::descriptor::{Importer, ImporterDescriptor, ImporterKind, ImporterType};
use super::host::{HostEnvironment, ImporterRegistration};
use crate::errors::ImportError;
use crate::model::Row;

/// Catalog of importer types, built once at service start
///
/// Holds three indices, each ordered by display name with ties kept in
/// registration order:
///
/// - all importers: element and setting kinds, the only ones a row may name
/// - field importers
/// - seed-capable importers
///
/// The registry is immutable after construction; share it by reference.
#[derive(Debug, Clone, Default)]
pub struct ImporterRegistry {
    all: Vec<Arc<ImporterType>>,
    fields: Vec<Arc<ImporterType>>,
    seeds: Vec<Arc<ImporterType>>,
    by_model: HashMap<String, Arc<ImporterType>>,
}

impl ImporterRegistry {
    /// Discover importer types and build the indices
    ///
    /// Collects the built-in set (plus conditional importers `host`
    /// supports), then lets each hook contribute more.
    pub fn discover(host: &dyn HostEnvironment, hooks: &[&dyn ImporterRegistration]) -> Self {
        let mut types = builtin_types(host);
        for hook in hooks {
            hook.register(&mut types);
        }
        Self::from_types(types)
    }

    /// Registry with only the built-in importers
    pub fn builtin(host: &dyn HostEnvironment) -> Self {
        Self::discover(host, &[])
    }

    /// Build the indices from an explicit list of types
    ///
    /// A model identifier registered twice keeps its first position and takes
    /// the later definition.
    pub fn from_types(types: Vec<ImporterType>) -> Self {
        let mut ordered: Vec<ImporterType> = Vec::with_capacity(types.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for importer_type in types {
            match positions.get(importer_type.model()) {
                Some(&pos) => {
                    tracing::warn!(
                        model = importer_type.model(),
                        "Importer registered twice; later registration replaces earlier"
                    );
                    ordered[pos] = importer_type;
                }
                None => {
                    positions.insert(importer_type.model().to_string(), ordered.len());
                    ordered.push(importer_type);
                }
            }
        }

        let mut registry = Self::default();
        for importer_type in ordered {
            let importer_type = Arc::new(importer_type);
            if importer_type.kind() == ImporterKind::Field {
                registry.fields.push(importer_type);
                continue;
            }
            if importer_type.descriptor().seed_capable {
                registry.seeds.push(Arc::clone(&importer_type));
            }
            registry
                .by_model
                .insert(importer_type.model().to_string(), Arc::clone(&importer_type));
            registry.all.push(importer_type);
        }

        // Stable: equal names keep registration order
        registry.all.sort_by(|a, b| a.name().cmp(b.name()));
        registry.fields.sort_by(|a, b| a.name().cmp(b.name()));
        registry.seeds.sort_by(|a, b| a.name().cmp(b.name()));

        tracing::debug!(
            importers = registry.all.len(),
            field_importers = registry.fields.len(),
            seed_importers = registry.seeds.len(),
            "Importer registry built"
        );

        registry
    }

    /// Element and setting importers, ordered by display name
    pub fn list_all(&self) -> impl Iterator<Item = &ImporterDescriptor> {
        self.all.iter().map(|t| t.descriptor())
    }

    /// Field importers, ordered by display name
    pub fn field_importers(&self) -> impl Iterator<Item = &ImporterDescriptor> {
        self.fields.iter().map(|t| t.descriptor())
    }

    /// Seed-capable importers, ordered by display name
    pub fn seed_importers(&self) -> impl Iterator<Item = &ImporterDescriptor> {
        self.seeds.iter().map(|t| t.descriptor())
    }

    /// Number of importers a row may name
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Look up a savable importer type by model identifier
    pub fn get(&self, model: &str) -> Option<&ImporterType> {
        self.by_model.get(model).map(|t| t.as_ref())
    }

    /// Descriptor for any registered model, field importers included
    pub fn descriptor(&self, model: &str) -> Option<&ImporterDescriptor> {
        self.get(model)
            .map(|t| t.descriptor())
            .or_else(|| self.find_field_importer_by_model(model))
    }

    /// First field importer whose model identifier equals `model`
    pub fn find_field_importer_by_model(&self, model: &str) -> Option<&ImporterDescriptor> {
        self.fields
            .iter()
            .find(|t| t.model() == model)
            .map(|t| t.descriptor())
    }

    /// Resolve a row to a configured importer instance
    ///
    /// Only identifiers present in the all-importers index are accepted; the
    /// row never chooses an arbitrary type. On success the reserved key is
    /// removed and the remaining fields configure the new instance.
    ///
    /// # Errors
    ///
    /// - `MissingModelKey` if the row has no `@model`
    /// - `UnknownModel` if `@model` is not a registered element or setting
    ///   importer (field importers included)
    pub fn resolve(&self, mut row: Row) -> Result<Importer, ImportError> {
        let model = match row.model() {
            Some(model) => model.to_string(),
            None => {
                return Err(match row.get(crate::model::MODEL_KEY) {
                    None => ImportError::MissingModelKey,
                    Some(other) => ImportError::UnknownModel {
                        model: render_model_value(other),
                    },
                })
            }
        };

        let importer_type = self
            .by_model
            .get(&model)
            .ok_or(ImportError::UnknownModel { model })?;

        row.take_model();
        Ok(importer_type.instantiate(row))
    }
}

fn render_model_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
