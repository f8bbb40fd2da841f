//! Importer types and the registry that resolves rows to them
//!
//! - [`ImporterKind`] / [`ImporterDescriptor`]: what an importer is
//! - [`ImporterType`]: descriptor plus statically registered constructor
//! - [`Importer`]: one instance configured from a row
//! - [`ImporterRegistry`]: discovery, indices and row resolution

mod builtin;
mod descriptor;
mod host;
mod registry;

pub use builtin::builtin_types;
pub use descriptor::{Importer, ImporterCtor, ImporterDescriptor, ImporterKind, ImporterType};
pub use host::{Capabilities, HostEnvironment, ImporterRegistration};
pub use registry::ImporterRegistry;
