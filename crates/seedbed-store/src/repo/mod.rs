//! Repository layer
//!
//! SQLite implementations of the collaborator traits the dispatcher saves
//! through, plus the seed ledger built on the weed records they write.

mod import_store;
mod ledger;

pub use import_store::{SqliteImportStore, StoredRecord};
pub use ledger::{SeedLedger, WeedSummary};
