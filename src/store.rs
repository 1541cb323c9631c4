use std::time::Duration;

use anyhow::Result;
use rusqlite::Connection;
use serde_json::Value;
use thiserror::Error;

use crate::config::StoreConfig;

/// Failures at the document-store boundary. Callers branch on the kind:
/// connection problems and lookup problems get different user-facing
/// messages, and a timed-out probe is reported as such, not as a generic
/// connection failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not open document store: {0}")]
    Connection(#[source] rusqlite::Error),
    #[error("document store did not respond within {0}s")]
    Timeout(u64),
    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Open the store, bound waiting by the configured timeout, and probe
/// liveness before handing the connection out.
pub fn connect(cfg: &StoreConfig) -> Result<Connection, StoreError> {
    let conn = Connection::open(&cfg.path).map_err(StoreError::Connection)?;
    conn.busy_timeout(Duration::from_secs(cfg.timeout_secs))
        .map_err(StoreError::Connection)?;

    conn.query_row("SELECT 1", [], |_| Ok(()))
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                StoreError::Timeout(cfg.timeout_secs)
            }
            other => StoreError::Connection(other),
        })?;

    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            id         INTEGER PRIMARY KEY,
            collection TEXT NOT NULL,
            job_id     TEXT NOT NULL,
            body       TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_documents_job ON documents(collection, job_id);
        ",
    )?;
    Ok(())
}

pub fn insert_document(
    conn: &Connection,
    collection: &str,
    job_id: &str,
    body: &Value,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO documents (collection, job_id, body) VALUES (?1, ?2, ?3)",
        rusqlite::params![collection, job_id, serde_json::to_string(body)?],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All document bodies for a job, in insertion order. Zero matches is an
/// empty Vec, not an error; the caller decides how to message that.
pub fn find_by_job_id(
    conn: &Connection,
    collection: &str,
    job_id: &str,
) -> Result<Vec<Value>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT body FROM documents WHERE collection = ?1 AND job_id = ?2 ORDER BY id")
        .map_err(|e| StoreError::Lookup(e.to_string()))?;

    let bodies = stmt
        .query_map(rusqlite::params![collection, job_id], |row| {
            row.get::<_, String>(0)
        })
        .and_then(|rows| rows.collect::<Result<Vec<String>, _>>())
        .map_err(|e| StoreError::Lookup(e.to_string()))?;

    bodies
        .iter()
        .map(|b| {
            serde_json::from_str(b)
                .map_err(|e| StoreError::Lookup(format!("malformed document body: {}", e)))
        })
        .collect()
}

// ── Stats ──

pub struct StoreStats {
    pub documents: usize,
    pub jobs: usize,
}

pub fn get_stats(conn: &Connection, collection: &str) -> Result<StoreStats> {
    let documents: usize = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE collection = ?1",
        [collection],
        |r| r.get(0),
    )?;
    let jobs: usize = conn.query_row(
        "SELECT COUNT(DISTINCT job_id) FROM documents WHERE collection = ?1",
        [collection],
        |r| r.get(0),
    )?;
    Ok(StoreStats { documents, jobs })
}
