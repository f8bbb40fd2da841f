//! Seed ledger queries and the weed operation

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, serialization_error, Result};
use crate::events::{emit_event, ImportEventKind};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use seedbed_core::importers::{ImporterKind, ImporterRegistry};
use seedbed_core::model::{SeedOrigin, Weed};

/// Outcome of one weed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeedSummary {
    /// Elements deleted
    pub elements_removed: usize,
    /// Settings deleted
    pub settings_removed: usize,
    /// Records whose item no longer existed
    pub already_gone: usize,
    /// Records left in place because their importer type is not registered
    pub skipped: usize,
}

impl WeedSummary {
    pub fn removed(&self) -> usize {
        self.elements_removed + self.settings_removed
    }
}

/// Read and reverse the seed ledger
pub struct SeedLedger;

impl SeedLedger {
    /// Weed records in the order they were written
    pub fn list(conn: &Connection, origin: Option<SeedOrigin>) -> Result<Vec<Weed>> {
        let mut stmt = conn
            .prepare(
                "SELECT item_id, importer_type, seed_origin, details, created_at FROM seeds
                 WHERE (?1 IS NULL OR seed_origin = ?1)
                 ORDER BY id",
            )
            .map_err(from_rusqlite)?;

        let raws = stmt
            .query_map([origin.map(|o| o.as_str())], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        raws.into_iter()
            .map(|(item_id, importer_type, seed_origin, details, created_at)| {
                Ok(Weed {
                    item_id,
                    importer_type,
                    seed_origin: seed_origin
                        .parse()
                        .map_err(|e: String| serialization_error("seed origin", e))?,
                    details,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map_err(|e| serialization_error("seed timestamp", e))?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }

    /// Number of weed records
    pub fn count(conn: &Connection, origin: Option<SeedOrigin>) -> Result<u64> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM seeds WHERE (?1 IS NULL OR seed_origin = ?1)",
                [origin.map(|o| o.as_str())],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(count as u64)
    }

    /// Delete every seeded item and its weed record
    ///
    /// Runs in one transaction. The importer type of each record is looked up
    /// in `registry` to decide which table the item lives in; records with an
    /// unregistered type are kept so a later run can remove them.
    pub fn weed(
        conn: &mut Connection,
        registry: &ImporterRegistry,
        origin: Option<SeedOrigin>,
    ) -> Result<WeedSummary> {
        let tx = conn.transaction().map_err(from_rusqlite)?;
        let mut summary = WeedSummary::default();

        let mut stmt = tx
            .prepare(
                "SELECT id, item_id, importer_type FROM seeds
                 WHERE (?1 IS NULL OR seed_origin = ?1)
                 ORDER BY id DESC",
            )
            .map_err(from_rusqlite)?;
        let records: Vec<(i64, String, String)> = stmt
            .query_map([origin.map(|o| o.as_str())], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        drop(stmt);

        for (seed_id, item_id, importer_type) in records {
            let kind = registry.descriptor(&importer_type).map(|d| d.kind);
            let table = match kind {
                Some(ImporterKind::Element) => "elements",
                Some(ImporterKind::Setting) => "settings",
                Some(ImporterKind::Field) | None => {
                    tracing::warn!(
                        item_id = %item_id,
                        importer_type = %importer_type,
                        "Weed record names no savable importer; kept"
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            let deleted = tx
                .execute(
                    &format!("DELETE FROM {} WHERE id = ?1 AND model = ?2", table),
                    rusqlite::params![item_id, importer_type],
                )
                .map_err(from_rusqlite)?;

            match (deleted, table) {
                (0, _) => summary.already_gone += 1,
                (_, "elements") => summary.elements_removed += 1,
                _ => summary.settings_removed += 1,
            }

            tx.execute("DELETE FROM seeds WHERE id = ?1", [seed_id])
                .map_err(from_rusqlite)?;
        }

        emit_event(
            &tx,
            ImportEventKind::WeedCompleted,
            None,
            None,
            Some(serde_json::json!({
                "origin": origin.map(|o| o.as_str()),
                "elements_removed": summary.elements_removed,
                "settings_removed": summary.settings_removed,
                "already_gone": summary.already_gone,
                "skipped": summary.skipped,
            })),
        )?;

        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(
            removed = summary.removed(),
            skipped = summary.skipped,
            "Weed complete"
        );
        Ok(summary)
    }
}
