use super::descriptor::{ImporterDescriptor, ImporterKind, ImporterType};
use super::host::HostEnvironment;

/// (display name, model identifier, seed capable)
const ELEMENTS: &[(&str, &str, bool)] = &[
    ("Asset", "element.asset", false),
    ("Category", "element.category", true),
    ("Entry", "element.entry", true),
    ("Tag", "element.tag", true),
    ("User", "element.user", true),
];

const FIELDS: &[(&str, &str)] = &[
    ("Assets", "field.assets"),
    ("Categories", "field.categories"),
    ("Checkboxes", "field.checkboxes"),
    ("Color", "field.color"),
    ("Date/Time", "field.date"),
    ("Dropdown", "field.dropdown"),
    ("Email", "field.email"),
    ("Entries", "field.entries"),
    ("Lightswitch", "field.lightswitch"),
    ("Matrix", "field.matrix"),
    ("Multi-select", "field.multi_select"),
    ("Number", "field.number"),
    ("Plain Text", "field.plain_text"),
    ("Radio Buttons", "field.radio_buttons"),
    ("Table", "field.table"),
    ("Tags", "field.tags"),
    ("URL", "field.url"),
    ("Users", "field.users"),
];

const SETTINGS: &[(&str, &str)] = &[
    ("Field", "setting.field"),
    ("Section", "setting.section"),
    ("Widget", "setting.widget"),
];

/// Field importers that only make sense when a host capability is installed:
/// (capability, display name, model identifier)
const CONDITIONAL_FIELDS: &[(&str, &str, &str)] = &[
    ("redactor", "Redactor", "field.redactor"),
    ("commerce", "Products", "field.products"),
];

/// The built-in importer set, in registration order
///
/// Conditional field importers are appended only when `host` reports their
/// capability.
pub fn builtin_types(host: &dyn HostEnvironment) -> Vec<ImporterType> {
    let mut types = Vec::with_capacity(ELEMENTS.len() + FIELDS.len() + SETTINGS.len() + 2);

    for &(name, model, seed_capable) in ELEMENTS {
        let mut descriptor = ImporterDescriptor::new(name, model, ImporterKind::Element);
        if seed_capable {
            descriptor = descriptor.seed_capable();
        }
        types.push(ImporterType::new(descriptor));
    }

    for &(name, model) in FIELDS {
        types.push(ImporterType::new(ImporterDescriptor::new(
            name,
            model,
            ImporterKind::Field,
        )));
    }

    for &(name, model) in SETTINGS {
        types.push(ImporterType::new(ImporterDescriptor::new(
            name,
            model,
            ImporterKind::Setting,
        )));
    }

    for &(capability, name, model) in CONDITIONAL_FIELDS {
        if host.has_capability(capability) {
            types.push(ImporterType::new(ImporterDescriptor::new(
                name,
                model,
                ImporterKind::Field,
            )));
        }
    }

    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::Capabilities;

    #[test]
    fn test_builtin_set_without_capabilities() {
        let types = builtin_types(&Capabilities::none());
        assert_eq!(types.len(), ELEMENTS.len() + FIELDS.len() + SETTINGS.len());
        assert!(types.iter().all(|t| t.model() != "field.redactor"));
    }

    #[test]
    fn test_conditional_importers_follow_capabilities() {
        let types = builtin_types(&Capabilities::from_iter(["commerce"]));
        assert!(types.iter().any(|t| t.model() == "field.products"));
        assert!(types.iter().all(|t| t.model() != "field.redactor"));
    }

    #[test]
    fn test_model_identifiers_unique() {
        let types = builtin_types(&Capabilities::from_iter(["commerce", "redactor"]));
        let mut models: Vec<&str> = types.iter().map(|t| t.model()).collect();
        models.sort_unstable();
        models.dedup();
        assert_eq!(models.len(), types.len());
    }
}
