use seedbed_core::{Capabilities, ImporterRegistry, Payload, SeedContext, SeedOrigin};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Registry with the built-in importers and no host capabilities
#[allow(dead_code)]
pub fn builtin_registry() -> ImporterRegistry {
    ImporterRegistry::builtin(&Capabilities::none())
}

/// Structured payload from a JSON value
#[allow(dead_code)]
pub fn payload(value: Value) -> Option<Payload> {
    Some(Payload::Decoded(value))
}

/// Seed context with seeding turned on
#[allow(dead_code)]
pub fn seeding(origin: SeedOrigin) -> SeedContext {
    SeedContext::new(origin, true)
}

/// Write `content` to `dir/name` and return the path
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Number of entries left in a directory
#[allow(dead_code)]
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
