//! Simple filters over loaded run records

use serde_json::Value;

use crate::record::RunRecord;

/// Return the runs whose `params[name]` equals `needle`, oldest first.
///
/// Equality is strict JSON equality: `0.01` does not match `0.010000001`
/// and the number `1` does not match the string `"1"`. Runs without the
/// parameter never match.
#[must_use]
pub fn find_by_param(records: &[RunRecord], name: &str, needle: &Value) -> Vec<RunRecord> {
    records
        .iter()
        .filter(|record| record.param(name) == Some(needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_with_lr(lr: f64) -> RunRecord {
        RunRecord::builder().param("lr", lr).build()
    }

    #[test]
    fn test_exact_float_equality() {
        let records = vec![run_with_lr(0.01), run_with_lr(0.010_000_001)];
        let matches = find_by_param(&records, "lr", &json!(0.01));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].param("lr"), Some(&json!(0.01)));
    }

    #[test]
    fn test_no_type_coercion() {
        let records = vec![
            RunRecord::builder().param("epochs", 1).build(),
            RunRecord::builder().param("epochs", "1").build(),
        ];
        assert_eq!(find_by_param(&records, "epochs", &json!(1)).len(), 1);
        assert_eq!(find_by_param(&records, "epochs", &json!("1")).len(), 1);
    }

    #[test]
    fn test_missing_param_never_matches() {
        let records = vec![RunRecord::builder().build()];
        assert!(find_by_param(&records, "lr", &json!(0.01)).is_empty());
        assert!(find_by_param(&records, "lr", &Value::Null).is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let records = vec![run_with_lr(0.1), run_with_lr(0.2), run_with_lr(0.1)];
        let matches = find_by_param(&records, "lr", &json!(0.1));
        assert_eq!(matches.len(), 2);
        assert_eq!(matches, vec![records[0].clone(), records[2].clone()]);
    }
}
