//! Migration framework
//!
//! Provides:
//! - Migration runner with checksum verification
//! - Idempotent application
//! - Embedded SQL migrations

mod embedded;
mod runner;

pub use embedded::{get_migrations, Migration};
pub use runner::{apply_migration_set, apply_migrations};
