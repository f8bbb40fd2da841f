use rusqlite::Connection;
use seedbed_core::{Capabilities, ImporterRegistry};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fresh migrated database in a scratch directory
#[allow(dead_code)]
pub fn setup_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let conn = seedbed_store::db::open_and_migrate(temp_dir.path().join("test.db")).unwrap();
    (temp_dir, conn)
}

/// Registry with the built-in importers and no host capabilities
#[allow(dead_code)]
pub fn builtin_registry() -> ImporterRegistry {
    ImporterRegistry::builtin(&Capabilities::none())
}

/// Write `content` to `dir/name`, creating parent directories
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Count rows of a table
#[allow(dead_code)]
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}
