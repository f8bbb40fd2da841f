use std::collections::HashSet;

use super::descriptor::ImporterType;

/// What the host installation provides
///
/// Conditional importers (rich text, commerce products) are only offered
/// when the matching capability is present.
pub trait HostEnvironment {
    fn has_capability(&self, name: &str) -> bool;
}

/// Fixed set of capability names
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    names: HashSet<String>,
}

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into().to_ascii_lowercase());
    }
}

impl<S: Into<String>> FromIterator<S> for Capabilities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut caps = Self::default();
        for name in iter {
            caps.insert(name);
        }
        caps
    }
}

impl HostEnvironment for Capabilities {
    fn has_capability(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }
}

/// Registration hook: lets outside code contribute importer types
///
/// Hooks run after the built-in and conditional types are collected and
/// before the registry sorts them.
pub trait ImporterRegistration {
    fn register(&self, types: &mut Vec<ImporterType>);
}

impl<F> ImporterRegistration for F
where
    F: Fn(&mut Vec<ImporterType>),
{
    fn register(&self, types: &mut Vec<ImporterType>) {
        self(types)
    }
}
