//! SQLite element/setting persistence and seed tracking

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, serialization_error, Result};
use rusqlite::{Connection, OptionalExtension};
use seedbed_core::importers::Importer;
use seedbed_core::model::{Row, SavedItem, Weed};
use seedbed_core::{ElementSaver, SeedTracker, SettingSaver};

/// A persisted element or setting
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub model: String,
    pub fields: Row,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Saves imported items and weed records to SQLite
///
/// A row whose settings carry an `id` matching an existing item of the same
/// model updates that item. Settings are also matched on `handle`.
pub struct SqliteImportStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteImportStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn get_element(&self, id: &str) -> Result<Option<StoredRecord>> {
        self.get_record("elements", id)
    }

    pub fn get_setting(&self, id: &str) -> Result<Option<StoredRecord>> {
        self.get_record("settings", id)
    }

    /// All elements, optionally of one model, in id order
    pub fn list_elements(&self, model: Option<&str>) -> Result<Vec<StoredRecord>> {
        self.list_records("elements", model)
    }

    /// All settings, optionally of one model, in id order
    pub fn list_settings(&self, model: Option<&str>) -> Result<Vec<StoredRecord>> {
        self.list_records("settings", model)
    }

    fn get_record(&self, table: &str, id: &str) -> Result<Option<StoredRecord>> {
        let sql = format!(
            "SELECT id, model, fields, created_at, updated_at FROM {} WHERE id = ?1",
            table
        );
        let raw = self
            .conn
            .query_row(&sql, [id], read_raw)
            .optional()
            .map_err(from_rusqlite)?;
        raw.map(RawRecord::decode).transpose()
    }

    fn list_records(&self, table: &str, model: Option<&str>) -> Result<Vec<StoredRecord>> {
        let sql = format!(
            "SELECT id, model, fields, created_at, updated_at FROM {}
             WHERE (?1 IS NULL OR model = ?1)
             ORDER BY id",
            table
        );
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let raws = stmt
            .query_map([model], read_raw)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        raws.into_iter().map(RawRecord::decode).collect()
    }
}

struct RawRecord {
    id: i64,
    model: String,
    fields: String,
    created_at: i64,
    updated_at: i64,
}

impl RawRecord {
    fn decode(self) -> Result<StoredRecord> {
        let fields: Row = serde_json::from_str(&self.fields)
            .map_err(|e| serialization_error("stored fields", e))?;
        Ok(StoredRecord {
            id: self.id.to_string(),
            model: self.model,
            fields,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: row.get(0)?,
        model: row.get(1)?,
        fields: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Fields stored for a new item
///
/// An `id` that matched no existing item is dropped so the stored fields
/// never disagree with the row id the item was given.
fn insert_fields(settings: &Row, what: &str) -> Result<String> {
    let mut fields = settings.clone();
    fields.remove("id");
    serde_json::to_string(&fields).map_err(|e| serialization_error(what, e))
}

/// Numeric item id carried by the row, if any
fn row_item_id(fields: &Row) -> Option<i64> {
    fields.get_id("id").and_then(|id| id.parse().ok())
}

impl ElementSaver for SqliteImportStore<'_> {
    fn save_element(&self, importer: &Importer) -> Result<SavedItem> {
        let model = importer.model();
        let fields = serde_json::to_string(importer.settings())
            .map_err(|e| serialization_error("element fields", e))?;
        let now = chrono::Utc::now().timestamp();

        if let Some(id) = row_item_id(importer.settings()) {
            let changed = self
                .conn
                .execute(
                    "UPDATE elements SET fields = ?1, updated_at = ?2 WHERE id = ?3 AND model = ?4",
                    rusqlite::params![fields, now, id, model],
                )
                .map_err(|e| from_rusqlite(e).with_op("save_element").with_model(model))?;
            if changed > 0 {
                return Ok(SavedItem::updated(id.to_string(), model));
            }
        }

        self.conn
            .execute(
                "INSERT INTO elements (model, fields, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                rusqlite::params![model, insert_fields(importer.settings(), "element fields")?, now],
            )
            .map_err(|e| from_rusqlite(e).with_op("save_element").with_model(model))?;

        Ok(SavedItem::created(
            self.conn.last_insert_rowid().to_string(),
            model,
        ))
    }
}

impl SettingSaver for SqliteImportStore<'_> {
    fn save_setting(&self, importer: &Importer) -> Result<SavedItem> {
        let model = importer.model();
        let settings = importer.settings();
        let handle = settings.get_str("handle").filter(|h| !h.is_empty());
        let fields = serde_json::to_string(settings)
            .map_err(|e| serialization_error("setting fields", e))?;
        let now = chrono::Utc::now().timestamp();

        let existing: Option<i64> = match row_item_id(settings) {
            Some(id) => self
                .conn
                .query_row(
                    "SELECT id FROM settings WHERE id = ?1 AND model = ?2",
                    rusqlite::params![id, model],
                    |row| row.get(0),
                )
                .optional()
                .map_err(from_rusqlite)?,
            None => None,
        };
        let existing = match (existing, handle) {
            (Some(id), _) => Some(id),
            (None, Some(handle)) => self
                .conn
                .query_row(
                    "SELECT id FROM settings WHERE model = ?1 AND handle = ?2",
                    rusqlite::params![model, handle],
                    |row| row.get(0),
                )
                .optional()
                .map_err(from_rusqlite)?,
            (None, None) => None,
        };

        if let Some(id) = existing {
            self.conn
                .execute(
                    "UPDATE settings SET handle = ?1, fields = ?2, updated_at = ?3 WHERE id = ?4",
                    rusqlite::params![handle, fields, now, id],
                )
                .map_err(|e| from_rusqlite(e).with_op("save_setting").with_model(model))?;
            return Ok(SavedItem::updated(id.to_string(), model));
        }

        self.conn
            .execute(
                "INSERT INTO settings (model, handle, fields, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![model, handle, insert_fields(settings, "setting fields")?, now],
            )
            .map_err(|e| from_rusqlite(e).with_op("save_setting").with_model(model))?;

        Ok(SavedItem::created(
            self.conn.last_insert_rowid().to_string(),
            model,
        ))
    }
}

impl SeedTracker for SqliteImportStore<'_> {
    fn track_seed(&self, weed: &Weed) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO seeds (item_id, importer_type, seed_origin, details, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    weed.item_id,
                    weed.importer_type,
                    weed.seed_origin.as_str(),
                    weed.details,
                    weed.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("track_seed")
                    .with_item_id(weed.item_id.clone())
            })?;
        Ok(())
    }
}
