//! Run Log - append-only JSONL persistence for training runs
//!
//! One JSON object per line, appended with a single write and an fsync.
//! Reads tolerate damage: blank lines are skipped, malformed lines are
//! skipped, a missing file is an empty history. The log also owns the
//! auto-export policy consulted after every append.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::RunRecord;
use crate::repair::{self, AuditReport};
use crate::{codec, export, query, report};

/// Default history file, one JSON record per line.
pub const DEFAULT_HISTORY_PATH: &str = "training_history.jsonl";

/// Default target for CSV auto-export.
pub const DEFAULT_EXPORT_PATH: &str = "training_history.csv";

/// Append-only run-history log backed by a JSONL file.
///
/// The log holds no file handle between operations; every call opens,
/// works, and closes. Single-writer by design: concurrent appends from
/// other processes are not coordinated, though reads skip any interleaved
/// damage they cause.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
    export_every: Option<NonZeroUsize>,
    export_target: PathBuf,
}

impl RunLog {
    /// Create a log over the given history file. The file itself is only
    /// created on the first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            export_every: None,
            export_target: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }

    /// Get the history file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the auto-export interval, if auto-export is enabled.
    #[must_use]
    pub const fn auto_export_interval(&self) -> Option<NonZeroUsize> {
        self.export_every
    }

    /// Get the CSV path auto-export writes to.
    #[must_use]
    pub fn auto_export_target(&self) -> &Path {
        &self.export_target
    }

    /// Append one run to the history file.
    ///
    /// The record is written as a single line followed by an fsync. A
    /// failed fsync is logged and swallowed, keeping the buffered write.
    /// When auto-export is enabled and this append reaches a multiple of
    /// the interval, the history is exported to CSV; any failure there is
    /// logged and swallowed so it cannot break a training loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or the line
    /// cannot be written.
    pub fn append(&self, record: &RunRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        if let Err(err) = file.sync_all() {
            warn!(path = %self.path.display(), %err, "fsync failed after append, keeping buffered write");
        }

        self.maybe_auto_export();
        Ok(())
    }

    /// Load all runs, oldest first.
    ///
    /// Blank lines are skipped. Malformed lines are skipped with a debug
    /// event so one interrupted write never hides the rest of the
    /// history. A missing file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Vec<RunRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RunRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(err) => {
                    debug!(line = number + 1, %err, "skipping malformed history line");
                }
            }
        }
        Ok(records)
    }

    /// Get the most recently appended run, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    pub fn last_run(&self) -> Result<Option<RunRecord>> {
        Ok(self.load()?.pop())
    }

    /// Count the loadable runs in the history.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// Print a compact summary of the `n` most recent runs to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    pub fn print_recent_runs(&self, n: usize) -> Result<()> {
        let records = self.load()?;
        if records.is_empty() {
            println!(
                "No runs recorded yet ({} not found or empty).",
                self.path.display()
            );
            return Ok(());
        }
        print!("{}", report::summary(&records, n));
        Ok(())
    }

    /// Export the full history to a CSV file, overwriting it.
    ///
    /// Returns the number of data rows written. An empty history writes
    /// nothing and returns 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read or the CSV cannot
    /// be written.
    pub fn export_csv(&self, csv_path: impl AsRef<Path>) -> Result<usize> {
        export::to_csv(&self.load()?, csv_path.as_ref())
    }

    /// Export the full history into a SQLite database, replacing the
    /// `runs` table contents.
    ///
    /// Returns the number of rows inserted. An empty history touches
    /// nothing and returns 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read or the database
    /// cannot be written.
    pub fn export_sqlite(&self, db_path: impl AsRef<Path>) -> Result<usize> {
        export::to_sqlite(&self.load()?, db_path.as_ref())
    }

    /// Scan the history file and report how many lines parse, without
    /// modifying anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn audit(&self) -> Result<AuditReport> {
        repair::audit_file(&self.path)
    }

    /// Rewrite the history file keeping every salvageable record, and
    /// return how many were kept.
    ///
    /// With `backup` set, a copy of the damaged file is left at the
    /// sibling `.bak` path first; a failed backup copy is logged and the
    /// repair continues. The rewrite goes through a temp file and an
    /// atomic rename, so a crash mid-repair leaves the original intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the repaired copy
    /// cannot be written into place.
    pub fn repair(&self, backup: bool) -> Result<usize> {
        repair::repair_file(&self.path, backup)
    }

    /// Find runs whose `params[name]` equals `value` exactly, oldest
    /// first.
    ///
    /// The needle is encoded the same way appended params are, and
    /// comparison is strict JSON equality: no numeric tolerance, no type
    /// coercion.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    pub fn find_by_param<V>(&self, name: &str, value: V) -> Result<Vec<RunRecord>>
    where
        V: Serialize + fmt::Debug,
    {
        let needle = codec::safe_value(&value);
        Ok(query::find_by_param(&self.load()?, name, &needle))
    }

    /// Enable CSV auto-export every `every` appended runs.
    ///
    /// When `csv_path` is given it becomes the new target; otherwise the
    /// current target (initially [`DEFAULT_EXPORT_PATH`]) is kept. The
    /// target also survives a disable/enable cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExportInterval`] if `every` is zero. The
    /// policy is left unchanged in that case.
    pub fn enable_auto_export(&mut self, every: usize, csv_path: Option<PathBuf>) -> Result<()> {
        let every = NonZeroUsize::new(every).ok_or(Error::InvalidExportInterval(every))?;
        self.export_every = Some(every);
        if let Some(path) = csv_path {
            self.export_target = path;
        }
        info!(
            every = every.get(),
            target_path = %self.export_target.display(),
            "auto-export enabled"
        );
        Ok(())
    }

    /// Disable auto-export. The configured target path is retained.
    pub fn disable_auto_export(&mut self) {
        self.export_every = None;
        info!("auto-export disabled");
    }

    fn maybe_auto_export(&self) {
        let Some(every) = self.export_every else {
            return;
        };
        if let Err(err) = self.run_auto_export(every) {
            warn!(
                target_path = %self.export_target.display(),
                %err,
                "auto-export failed, append unaffected"
            );
        }
    }

    fn run_auto_export(&self, every: NonZeroUsize) -> Result<()> {
        let records = self.load()?;
        if !records.is_empty() && records.len() % every.get() == 0 {
            let rows = export::to_csv(&records, &self.export_target)?;
            info!(rows, target_path = %self.export_target.display(), "auto-exported run history");
        }
        Ok(())
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_in(dir: &tempfile::TempDir) -> RunLog {
        RunLog::new(dir.path().join("history.jsonl"))
    }

    #[test]
    fn test_default_paths() {
        let log = RunLog::default();
        assert_eq!(log.path(), Path::new(DEFAULT_HISTORY_PATH));
        assert_eq!(log.auto_export_target(), Path::new(DEFAULT_EXPORT_PATH));
        assert!(log.auto_export_interval().is_none());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        assert_eq!(log.load().unwrap(), Vec::new());
        assert_eq!(log.count().unwrap(), 0);
        assert!(log.last_run().unwrap().is_none());
    }

    #[test]
    fn test_append_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        let record = RunRecord::builder()
            .param("lr", 0.01)
            .metric("mae", 2.5)
            .build();
        log.append(&record).unwrap();

        let loaded = log.load().unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn test_last_run_is_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        for epochs in [5_i64, 10, 20] {
            log.append(&RunRecord::builder().param("epochs", epochs).build())
                .unwrap();
        }

        let last = log.last_run().unwrap().unwrap();
        assert_eq!(last.param("epochs"), Some(&serde_json::json!(20)));
    }

    #[test]
    fn test_blank_and_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.append(&RunRecord::builder().metric("mae", 1.0).build())
            .unwrap();
        OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap()
            .write_all(b"\n{\"broken\n\n")
            .unwrap();
        log.append(&RunRecord::builder().metric("mae", 2.0).build())
            .unwrap();

        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn test_enable_auto_export_zero_rejected() {
        let mut log = RunLog::new("unused.jsonl");
        let err = log.enable_auto_export(0, Some(PathBuf::from("runs.csv")));
        assert!(matches!(err, Err(Error::InvalidExportInterval(0))));
        // Rejection happens before any state change
        assert!(log.auto_export_interval().is_none());
        assert_eq!(log.auto_export_target(), Path::new(DEFAULT_EXPORT_PATH));
    }

    #[test]
    fn test_auto_export_target_survives_disable() {
        let mut log = RunLog::new("unused.jsonl");
        log.enable_auto_export(2, Some(PathBuf::from("runs.csv")))
            .unwrap();
        log.disable_auto_export();
        assert!(log.auto_export_interval().is_none());
        assert_eq!(log.auto_export_target(), Path::new("runs.csv"));

        log.enable_auto_export(4, None).unwrap();
        assert_eq!(log.auto_export_interval().map(NonZeroUsize::get), Some(4));
        assert_eq!(log.auto_export_target(), Path::new("runs.csv"));
    }
}
