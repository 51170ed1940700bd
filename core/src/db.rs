use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::CoreError;
use crate::migrations::MIGRATIONS;

pub struct SqliteStore {
    pub path: PathBuf,
    pub conn: Connection,
}

pub fn open_store(path: impl AsRef<Path>) -> Result<SqliteStore, CoreError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::InvalidArgument(e.to_string()))?;
    }
    let conn = Connection::open(&path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL; \
         PRAGMA synchronous = NORMAL; \
         PRAGMA foreign_keys = ON; \
         PRAGMA temp_store = MEMORY;",
    )?;
    apply_migrations(&conn)?;
    tracing::debug!(path = %path.display(), "message store opened");
    Ok(SqliteStore { path, conn })
}

pub fn open_in_memory() -> Result<SqliteStore, CoreError> {
    let conn = Connection::open_in_memory()?;
    apply_migrations(&conn)?;
    Ok(SqliteStore {
        path: PathBuf::from(":memory:"),
        conn,
    })
}

pub fn apply_migrations(conn: &Connection) -> Result<(), CoreError> {
    let current_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let mut version = current_version as usize;
    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let next_version = idx + 1;
        if next_version <= version {
            continue;
        }
        conn.execute_batch(sql)?;
        conn.execute_batch(&format!("PRAGMA user_version = {};", next_version))?;
        version = next_version;
    }
    Ok(())
}
