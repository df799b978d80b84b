//! Compact text summaries of recent runs

use chrono::SecondsFormat;
use serde_json::Value;

use crate::record::RunRecord;

/// How many params the one-line summary shows per run.
const PARAM_SUMMARY_KEYS: usize = 3;

/// Render the `n` most recent runs as a text block, most recent last.
///
/// One line per run: timestamp, up to three params as `key=value`, the
/// `mae` and `rmse` metrics (`-` when absent), and the `final` model path
/// falling back to `best` then `-`. Returns an empty string when `n` is
/// zero or there are no records.
#[must_use]
pub fn summary(records: &[RunRecord], n: usize) -> String {
    if records.is_empty() || n == 0 {
        return String::new();
    }

    let tail = &records[records.len().saturating_sub(n)..];
    let header = format!("Showing {} most recent runs (most recent last):", tail.len());

    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');
    for record in tail {
        out.push_str(&run_line(record));
        out.push('\n');
    }
    out
}

fn run_line(record: &RunRecord) -> String {
    let timestamp = record
        .timestamp()
        .to_rfc3339_opts(SecondsFormat::AutoSi, true);
    let params = record
        .params()
        .iter()
        .take(PARAM_SUMMARY_KEYS)
        .map(|(name, value)| format!("{name}={}", value_text(value)))
        .collect::<Vec<_>>()
        .join(", ");
    let mae = record.metric("mae").map_or_else(|| "-".to_string(), value_text);
    let rmse = record.metric("rmse").map_or_else(|| "-".to_string(), value_text);
    let model = record
        .model_path("final")
        .or_else(|| record.model_path("best"))
        .unwrap_or("-");

    format!("{timestamp} | {params} | MAE={mae} | RMSE={rmse} | model={model}")
}

/// Bare text for a summary cell: strings lose their JSON quotes,
/// everything else renders as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
