//! Repair and audit for damaged history files
//!
//! A crash mid-append or an uncoordinated second writer can leave the
//! history with truncated or noise-prefixed lines. Audit counts the
//! damage without touching the file. Repair rewrites the file keeping
//! every record it can still recover, going through a temp file and an
//! atomic rename so the original is never half-overwritten.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::record::RunRecord;

/// Suffix of the backup file an opted-in repair leaves behind.
pub const BACKUP_SUFFIX: &str = ".bak";

const TMP_SUFFIX: &str = ".tmp";

/// Line counts from a read-only scan of the history file.
///
/// Blank lines are invisible here, exactly as they are to loading, so
/// `total_lines` is always `valid_lines + malformed_lines`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditReport {
    /// Non-blank lines seen.
    pub total_lines: usize,
    /// Lines that parse as a record, directly or after trimming leading
    /// noise before the first `{`.
    pub valid_lines: usize,
    /// Lines no record could be recovered from.
    pub malformed_lines: usize,
}

impl AuditReport {
    /// True when every non-blank line holds a loadable record.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.malformed_lines == 0
    }
}

/// The path repair backs the history file up to.
#[must_use]
pub fn backup_path(history_path: &Path) -> PathBuf {
    sibling_with_suffix(history_path, BACKUP_SUFFIX)
}

pub(crate) fn audit_file(path: &Path) -> Result<AuditReport> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AuditReport::default()),
        Err(err) => return Err(err.into()),
    };

    let mut report = AuditReport::default();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        report.total_lines += 1;
        if is_recoverable(trimmed) {
            report.valid_lines += 1;
        } else {
            report.malformed_lines += 1;
        }
    }
    Ok(report)
}

pub(crate) fn repair_file(path: &Path, backup: bool) -> Result<usize> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no history file to repair");
            return Ok(0);
        }
        Err(err) => return Err(err.into()),
    };

    if backup {
        let backup_target = backup_path(path);
        if let Err(err) = fs::copy(path, &backup_target) {
            warn!(
                backup_path = %backup_target.display(),
                %err,
                "backup copy failed, continuing repair without it"
            );
        }
    }

    let mut recovered = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match salvage(trimmed) {
            Some(record) => recovered.push(record),
            None => debug!(line = number + 1, "dropping unrecoverable history line"),
        }
    }

    let tmp_path = sibling_with_suffix(path, TMP_SUFFIX);
    write_records(&tmp_path, &recovered)?;
    fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), recovered = recovered.len(), "rewrote history file");
    Ok(recovered.len())
}

/// Audit's notion of recoverable: a direct parse, or one salvage attempt
/// from the first `{` in the line.
fn is_recoverable(line: &str) -> bool {
    serde_json::from_str::<RunRecord>(line).is_ok()
        || line
            .find('{')
            .is_some_and(|start| serde_json::from_str::<RunRecord>(&line[start..]).is_ok())
}

/// Recover a record from a line, retrying from every `{` position.
///
/// Best-effort: noise that itself contains braces can still defeat the
/// scan or shift where the object is found.
fn salvage(line: &str) -> Option<RunRecord> {
    if let Ok(record) = serde_json::from_str(line) {
        return Some(record);
    }
    line.match_indices('{')
        .find_map(|(start, _)| serde_json::from_str(&line[start..]).ok())
}

fn write_records(path: &Path, records: &[RunRecord]) -> Result<()> {
    let mut file = File::create(path)?;
    for record in records {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
    }
    file.sync_all()?;
    Ok(())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("history"), ToOwned::to_owned);
    name.push(suffix);
    path.with_file_name(name)
}
