#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Importer registry tests
//!
//! ## Scenarios Covered
//!
//! 1. Built-in indices and their ordering
//! 2. Conditional importers follow host capabilities
//! 3. Registration hooks contribute importers before sorting
//! 4. Row resolution against the all-importers index

mod common;

use seedbed_core::errors::ImportError;
use seedbed_core::importers::{
    Capabilities, Importer, ImporterDescriptor, ImporterKind, ImporterRegistration,
    ImporterRegistry, ImporterType,
};
use seedbed_core::model::Row;
use serde_json::json;
use std::sync::Arc;

fn names<'a>(descriptors: impl Iterator<Item = &'a ImporterDescriptor>) -> Vec<&'a str> {
    descriptors.map(|d| d.name.as_str()).collect()
}

#[test]
fn test_builtin_all_index_ordered_by_name() {
    let registry = common::builtin_registry();

    assert_eq!(
        names(registry.list_all()),
        vec!["Asset", "Category", "Entry", "Field", "Section", "Tag", "User", "Widget"]
    );
}

#[test]
fn test_seed_index_lists_seedable_elements() {
    let registry = common::builtin_registry();

    assert_eq!(
        names(registry.seed_importers()),
        vec!["Category", "Entry", "Tag", "User"]
    );
}

#[test]
fn test_field_index_ordered_and_searchable() {
    let registry = common::builtin_registry();

    let field_names = names(registry.field_importers());
    let mut sorted = field_names.clone();
    sorted.sort();
    assert_eq!(field_names, sorted);

    let dropdown = registry.find_field_importer_by_model("field.dropdown").unwrap();
    assert_eq!(dropdown.name, "Dropdown");
    assert!(registry.find_field_importer_by_model("element.entry").is_none());
}

#[test]
fn test_conditional_importers_need_capability() {
    // GIVEN a host without extras
    let plain = ImporterRegistry::builtin(&Capabilities::none());
    assert!(plain.find_field_importer_by_model("field.redactor").is_none());
    assert!(plain.find_field_importer_by_model("field.products").is_none());

    // WHEN the host has both rich text and commerce installed
    let extended = ImporterRegistry::builtin(&Capabilities::from_iter(["redactor", "commerce"]));

    // THEN both conditional field importers are offered
    assert_eq!(
        extended.find_field_importer_by_model("field.redactor").unwrap().name,
        "Redactor"
    );
    assert_eq!(
        extended.find_field_importer_by_model("field.products").unwrap().name,
        "Products"
    );
}

#[test]
fn test_hook_contributes_importer_sorted_in() {
    let hook = |types: &mut Vec<ImporterType>| {
        types.push(ImporterType::new(
            ImporterDescriptor::new("Order", "element.order", ImporterKind::Element).seed_capable(),
        ));
    };
    let hooks: [&dyn ImporterRegistration; 1] = [&hook];

    let registry = ImporterRegistry::discover(&Capabilities::none(), &hooks);

    assert_eq!(
        names(registry.list_all()),
        vec!["Asset", "Category", "Entry", "Field", "Order", "Section", "Tag", "User", "Widget"]
    );
    assert!(names(registry.seed_importers()).contains(&"Order"));
    assert!(registry.get("element.order").is_some());
}

#[test]
fn test_equal_names_keep_registration_order() {
    let types = vec![
        ImporterType::new(ImporterDescriptor::new("Block", "setting.block_b", ImporterKind::Setting)),
        ImporterType::new(ImporterDescriptor::new("Block", "setting.block_a", ImporterKind::Setting)),
        ImporterType::new(ImporterDescriptor::new("Album", "element.album", ImporterKind::Element)),
    ];

    let registry = ImporterRegistry::from_types(types);

    let models: Vec<&str> = registry.list_all().map(|d| d.model.as_str()).collect();
    assert_eq!(models, vec!["element.album", "setting.block_b", "setting.block_a"]);
}

fn titled(descriptor: Arc<ImporterDescriptor>, mut settings: Row) -> Importer {
    if !settings.contains_key("title") {
        settings.insert("title", json!("Untitled"));
    }
    Importer::new(descriptor, settings)
}

#[test]
fn test_resolve_uses_registered_constructor() {
    let types = vec![ImporterType::with_ctor(
        ImporterDescriptor::new("Entry", "element.entry", ImporterKind::Element),
        titled,
    )];
    let registry = ImporterRegistry::from_types(types);

    let row = Row::try_from(json!({"@model": "element.entry", "slug": "a"})).unwrap();
    let importer = registry.resolve(row).unwrap();

    assert_eq!(importer.settings().get_str("title"), Some("Untitled"));
    assert_eq!(importer.settings().get_str("slug"), Some("a"));
    assert!(!importer.settings().contains_key("@model"));
}

#[test]
fn test_resolve_reports_missing_and_unknown() {
    let registry = common::builtin_registry();

    let missing = registry
        .resolve(Row::try_from(json!({"title": "A"})).unwrap())
        .unwrap_err();
    assert_eq!(missing, ImportError::MissingModelKey);

    let unknown = registry
        .resolve(Row::try_from(json!({"@model": "Craft\\Entry"})).unwrap())
        .unwrap_err();
    assert_eq!(
        unknown,
        ImportError::UnknownModel {
            model: "Craft\\Entry".to_string()
        }
    );
}

#[test]
fn test_descriptor_lookup_covers_field_importers() {
    let registry = common::builtin_registry();

    assert_eq!(
        registry.descriptor("setting.widget").unwrap().kind,
        ImporterKind::Setting
    );
    assert_eq!(
        registry.descriptor("field.table").unwrap().kind,
        ImporterKind::Field
    );
    assert!(registry.descriptor("field.nope").is_none());
}
