//! Seed ledger commands: listing tracked items and weeding them.
//!
//! ## Logging Ownership
//!
//! `weed` logs its lifecycle. Listing is a read and logs nothing.

#![allow(clippy::result_large_err)]

use rusqlite::Connection;
use seedbed_core::{log_op_end, log_op_error, log_op_start};
use seedbed_core::{ImporterRegistry, Result, SeedOrigin, Weed};
use seedbed_store::{SeedLedger, WeedSummary};

/// Weed records in the order they were written
pub fn list_seeds(conn: &Connection, origin: Option<SeedOrigin>) -> Result<Vec<Weed>> {
    SeedLedger::list(conn, origin)
}

/// Remove every seeded item, optionally only those of one origin
///
/// All deletions happen in one transaction; on error nothing is removed.
pub fn weed(
    conn: &mut Connection,
    registry: &ImporterRegistry,
    origin: Option<SeedOrigin>,
) -> Result<WeedSummary> {
    let origin_label = origin.map(|o| o.as_str()).unwrap_or("all");
    log_op_start!("weed", origin = origin_label);
    let start = std::time::Instant::now();

    let result = SeedLedger::weed(conn, registry, origin).map_err(|e| {
        log_op_error!(
            "weed",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            origin = origin_label
        );
        e
    })?;

    log_op_end!(
        "weed",
        duration_ms = start.elapsed().as_millis() as u64,
        origin = origin_label,
        removed = result.removed(),
        already_gone = result.already_gone,
        skipped = result.skipped
    );

    Ok(result)
}
