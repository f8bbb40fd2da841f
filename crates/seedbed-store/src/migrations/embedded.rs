//! Embedded SQL migrations
//!
//! Migration SQL is compiled into the binary with `include_str!`. Each
//! migration's checksum is the hex SHA-256 of its SQL text; the runner
//! records it when the migration is applied and compares it on every later
//! run.

use sha2::{Digest, Sha256};

/// One named migration step
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

impl Migration {
    /// Hex SHA-256 of the migration SQL
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.sql.as_bytes()))
    }
}

/// The embedded import schema, in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_import_schema",
            sql: include_str!("../../migrations/001_import_schema.sql"),
        },
        Migration {
            id: "002_job_queue",
            sql: include_str!("../../migrations/002_job_queue.sql"),
        },
    ]
}
