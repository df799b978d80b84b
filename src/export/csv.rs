//! CSV export of the run history

use std::path::Path;

use chrono::SecondsFormat;
use csv::Writer;
use tracing::info;

use crate::error::Result;
use crate::record::RunRecord;

/// Write all runs to a CSV file, overwriting it, and return the number
/// of data rows written.
///
/// Columns: `timestamp,params,metrics,model_paths,history`, with the
/// four structured columns JSON-encoded. An empty history writes nothing
/// and returns 0, leaving any existing file as it was.
///
/// # Errors
///
/// Returns an error if a record cannot be encoded or the file cannot be
/// written.
pub fn to_csv(records: &[RunRecord], csv_path: &Path) -> Result<usize> {
    if records.is_empty() {
        info!("no runs to export, leaving CSV untouched");
        return Ok(0);
    }

    let mut writer = Writer::from_path(csv_path)?;
    writer.write_record(["timestamp", "params", "metrics", "model_paths", "history"])?;
    for record in records {
        writer.write_record([
            record
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            serde_json::to_string(record.params())?,
            serde_json::to_string(record.metrics())?,
            serde_json::to_string(&record.model_paths())?,
            serde_json::to_string(&record.history())?,
        ])?;
    }
    writer.flush()?;

    info!(rows = records.len(), csv_path = %csv_path.display(), "exported run history to CSV");
    Ok(records.len())
}
