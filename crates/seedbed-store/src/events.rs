//! Import lifecycle events
//!
//! Records job lifecycle transitions and weed runs in the import_events
//! table, so an operator can reconstruct what happened to a job after the
//! fact.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

/// Import event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportEventKind {
    /// Job accepted by the queue
    JobQueued,
    /// Worker claimed the job
    JobStarted,
    /// Job ran; individual rows may still have failed
    JobCompleted,
    /// Job could not be run or saved nothing
    JobFailed,
    /// Seeded items were removed
    WeedCompleted,
}

impl ImportEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportEventKind::JobQueued => "job_queued",
            ImportEventKind::JobStarted => "job_started",
            ImportEventKind::JobCompleted => "job_completed",
            ImportEventKind::JobFailed => "job_failed",
            ImportEventKind::WeedCompleted => "weed_completed",
        }
    }
}

/// A recorded event
#[derive(Debug, Clone, PartialEq)]
pub struct ImportEvent {
    pub kind: String,
    pub job_id: Option<String>,
    pub request_id: Option<String>,
    pub timestamp: i64,
    pub metadata: serde_json::Value,
}

/// Emit an import event
///
/// Accepts a plain connection or a transaction (which derefs to one).
pub fn emit_event(
    conn: &Connection,
    kind: ImportEventKind,
    job_id: Option<&str>,
    request_id: Option<&str>,
    metadata: Option<serde_json::Value>,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    let metadata_str = metadata
        .map(|m| m.to_string())
        .unwrap_or_else(|| "{}".to_string());

    conn.execute(
        "INSERT INTO import_events (kind, job_id, request_id, timestamp, metadata) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![kind.as_str(), job_id, request_id, now, metadata_str],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Events in insertion order, optionally only those of one job
pub fn list_events(conn: &Connection, job_id: Option<&str>) -> Result<Vec<ImportEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT kind, job_id, request_id, timestamp, metadata FROM import_events
             WHERE (?1 IS NULL OR job_id = ?1)
             ORDER BY id",
        )
        .map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([job_id], |row| {
            let metadata: String = row.get(4)?;
            Ok(ImportEvent {
                kind: row.get(0)?,
                job_id: row.get(1)?,
                request_id: row.get(2)?,
                timestamp: row.get(3)?,
                metadata: serde_json::from_str(&metadata).unwrap_or(serde_json::Value::Null),
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory_migrated;
    use serde_json::json;

    #[test]
    fn test_emit_and_list_by_job() {
        let conn = open_in_memory_migrated().unwrap();
        emit_event(&conn, ImportEventKind::JobQueued, Some("j1"), Some("r1"), None).unwrap();
        emit_event(
            &conn,
            ImportEventKind::JobCompleted,
            Some("j1"),
            None,
            Some(json!({"saved": 2})),
        )
        .unwrap();
        emit_event(&conn, ImportEventKind::JobQueued, Some("j2"), None, None).unwrap();

        let events = list_events(&conn, Some("j1")).unwrap();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["job_queued", "job_completed"]);
        assert_eq!(events[1].metadata["saved"], 2);

        assert_eq!(list_events(&conn, None).unwrap().len(), 3);
    }
}
