//! Comprehensive property-based tests for bitacora
//!
//! Following ruchy/trueno/aprender pattern:
//! - Test data integrity properties
//! - Run with ProptestConfig::with_cases(100)
//! - Must complete in <30 seconds for pre-commit hook

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::Value;

use bitacora::codec::safe_f64;
use bitacora::{RunLog, RunRecord};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a JSON scalar that roundtrips exactly through the wire format
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e9..1.0e9f64).prop_map(Value::from),
        "[a-zA-Z0-9_./-]{0,16}".prop_map(Value::from),
    ]
}

/// Generate a timestamp with arbitrary sub-second precision
fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

/// Generate a full run record
fn arb_record() -> impl Strategy<Value = RunRecord> {
    (
        arb_timestamp(),
        proptest::collection::btree_map("[a-z]{1,8}", arb_scalar(), 0..4),
        proptest::collection::btree_map("[a-z]{1,8}", arb_scalar(), 0..4),
        proptest::option::of(proptest::collection::vec(-1.0e6..1.0e6f64, 1..6)),
        proptest::option::of("[a-z0-9_/]{1,20}"),
    )
        .prop_map(|(timestamp, params, metrics, loss_series, final_path)| {
            let mut builder = RunRecord::builder().timestamp(timestamp);
            for (name, value) in params {
                builder = builder.param(name, value);
            }
            for (name, value) in metrics {
                builder = builder.metric_value(name, value);
            }
            if let Some(series) = loss_series {
                builder = builder.epoch_series("loss", &series);
            }
            if let Some(path) = final_path {
                builder = builder.model_path("final", path);
            }
            builder.build()
        })
}

/// Generate a line that can never parse or salvage as a record
fn arb_garbage_line() -> impl Strategy<Value = String> {
    "[a-z]{1,30}"
}

fn write_interleaved(log: &RunLog, records: &[RunRecord], garbage: &[String]) {
    let mut content = String::new();
    for (index, record) in records.iter().enumerate() {
        content.push_str(&serde_json::to_string(record).unwrap());
        content.push('\n');
        if let Some(line) = garbage.get(index) {
            content.push_str(line);
            content.push('\n');
        }
    }
    for line in garbage.iter().skip(records.len()) {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(log.path(), content).unwrap();
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Wire Format Properties
    // ========================================================================

    /// Property: encode-then-decode is the identity on records
    #[test]
    fn prop_record_roundtrip_identity(record in arb_record()) {
        let line = serde_json::to_string(&record).unwrap();
        let decoded: RunRecord = serde_json::from_str(&line).unwrap();
        prop_assert_eq!(decoded, record);
    }

    /// Property: safe_f64 keeps finite floats as numbers and everything
    /// else as strings, for any bit pattern
    #[test]
    fn prop_safe_f64_total(bits in any::<u64>()) {
        let value = f64::from_bits(bits);
        let encoded = safe_f64(value);
        if value.is_finite() {
            prop_assert!(encoded.is_number());
        } else {
            prop_assert!(encoded.is_string());
        }
    }

    // ========================================================================
    // Log Store Properties
    // ========================================================================

    /// Property: appending N records then loading returns exactly those
    /// records in append order
    #[test]
    fn prop_append_load_roundtrip(records in proptest::collection::vec(arb_record(), 0..8)) {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("history.jsonl"));

        for record in &records {
            log.append(record).unwrap();
        }

        prop_assert_eq!(log.load().unwrap(), records);
    }

    /// Property: garbage lines never hide or reorder real records
    #[test]
    fn prop_load_skips_garbage(
        records in proptest::collection::vec(arb_record(), 0..6),
        garbage in proptest::collection::vec(arb_garbage_line(), 0..6),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("history.jsonl"));
        write_interleaved(&log, &records, &garbage);

        prop_assert_eq!(log.load().unwrap(), records);
    }

    // ========================================================================
    // Audit / Repair Properties
    // ========================================================================

    /// Property: audit counts add up and classify exactly
    #[test]
    fn prop_audit_counts_exact(
        records in proptest::collection::vec(arb_record(), 0..6),
        garbage in proptest::collection::vec(arb_garbage_line(), 0..6),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("history.jsonl"));
        write_interleaved(&log, &records, &garbage);

        let report = log.audit().unwrap();
        prop_assert_eq!(report.total_lines, records.len() + garbage.len());
        prop_assert_eq!(report.valid_lines, records.len());
        prop_assert_eq!(report.malformed_lines, garbage.len());
        prop_assert_eq!(report.total_lines, report.valid_lines + report.malformed_lines);
    }

    /// Property: repair keeps every well-formed record, drops every
    /// garbage line, and leaves a clean file
    #[test]
    fn prop_repair_keeps_valid_records(
        records in proptest::collection::vec(arb_record(), 0..6),
        garbage in proptest::collection::vec(arb_garbage_line(), 1..6),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("history.jsonl"));
        write_interleaved(&log, &records, &garbage);

        let recovered = log.repair(false).unwrap();
        prop_assert_eq!(recovered, records.len());
        prop_assert_eq!(log.load().unwrap(), records);
        prop_assert!(log.audit().unwrap().is_clean());
    }

    // ========================================================================
    // Query Properties
    // ========================================================================

    /// Property: every match really carries the needle value, and
    /// matches keep their original relative order
    #[test]
    fn prop_find_by_param_exactness(
        records in proptest::collection::vec(arb_record(), 0..8),
        needle in arb_scalar(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("history.jsonl"));
        for record in &records {
            log.append(record).unwrap();
        }

        let matches = log.find_by_param("lr", needle.clone()).unwrap();
        for found in &matches {
            prop_assert_eq!(found.param("lr"), Some(&needle));
        }

        let expected: Vec<RunRecord> = records
            .iter()
            .filter(|record| record.param("lr") == Some(&needle))
            .cloned()
            .collect();
        prop_assert_eq!(matches, expected);
    }
}
