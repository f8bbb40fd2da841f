//! Seedbed Store - SQLite persistence for imports
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - Element/setting saving and seed tracking (`SqliteImportStore`)
//! - The seed ledger and the weed operation (`SeedLedger`)
//! - A durable job queue (`SqliteJobQueue`) with lifecycle events

pub mod db;
pub mod errors;
pub mod events;
pub mod migrations;
pub mod queue;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use queue::{Claim, JobStatus, QueueCounts, QueuedJob, SqliteJobQueue};
pub use repo::{SeedLedger, SqliteImportStore, StoredRecord, WeedSummary};
