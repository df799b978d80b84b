//! SQLite export of the run history

use std::path::Path;

use chrono::SecondsFormat;
use rusqlite::{params, Connection};
use tracing::info;

use crate::error::Result;
use crate::record::RunRecord;

/// Write all runs into the `runs` table of a SQLite database, replacing
/// its previous contents, and return the number of rows inserted.
///
/// The database and table are created on first use. The clear and the
/// inserts run in one transaction, so a failed export leaves the
/// previous rows in place. An empty history touches nothing and returns
/// 0.
///
/// # Errors
///
/// Returns an error if a record cannot be encoded or the database cannot
/// be opened or written.
pub fn to_sqlite(records: &[RunRecord], db_path: &Path) -> Result<usize> {
    if records.is_empty() {
        info!("no runs to export, leaving SQLite database untouched");
        return Ok(0);
    }

    let mut conn = Connection::open(db_path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT,
            params TEXT,
            metrics TEXT,
            model_paths TEXT,
            history TEXT
        )",
        [],
    )?;

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM runs", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO runs (timestamp, params, metrics, model_paths, history)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for record in records {
            stmt.execute(params![
                record
                    .timestamp()
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                serde_json::to_string(record.params())?,
                serde_json::to_string(record.metrics())?,
                serde_json::to_string(&record.model_paths())?,
                serde_json::to_string(&record.history())?,
            ])?;
        }
    }
    tx.commit()?;

    info!(rows = records.len(), db_path = %db_path.display(), "exported run history to SQLite");
    Ok(records.len())
}
