pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the journal database at the given path, with the key-value
/// table initialized.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(std::time::Duration::from_millis(5000))?;

    schema::init_schema(&conn).context("failed to initialize schema")?;

    tracing::trace!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Open an in-memory database for testing.
#[cfg(test)]
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug)]
pub struct HealthReport {
    pub integrity_ok: bool,
    pub integrity_details: String,
    pub key_count: u64,
    pub keys: Vec<String>,
}

/// Run `PRAGMA integrity_check` and collect the stored keys.
pub fn check_database_health(conn: &Connection) -> rusqlite::Result<HealthReport> {
    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    let keys: Vec<String> = conn
        .prepare("SELECT key FROM kv_store ORDER BY key")?
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HealthReport {
        integrity_ok: integrity_details == "ok",
        integrity_details,
        key_count: keys.len() as u64,
        keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_passes_on_fresh_db() {
        let conn = open_memory_database().unwrap();
        let report = check_database_health(&conn).unwrap();
        assert!(report.integrity_ok);
        assert_eq!(report.key_count, 0);
        assert!(report.keys.is_empty());
    }

    #[test]
    fn health_check_lists_keys() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES ('theme', '\"dark\"', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let report = check_database_health(&conn).unwrap();
        assert_eq!(report.keys, vec!["theme".to_string()]);
    }
}
