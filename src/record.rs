//! Run Record - one recorded training run
//!
//! Each record captures a completed run: the hyperparameters it used, the
//! final evaluation metrics, an optional per-epoch history, and the paths
//! of any saved model artifacts.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec;

/// A single training run, as stored on one line of the history file.
///
/// `params` and `metrics` are opaque key-value maps shaped by the caller;
/// nothing here validates which hyperparameters or metrics a run reports.
/// `history` and `model_paths` are optional and serialize as `null` when
/// absent. Lines missing `timestamp`, `params`, or `metrics` do not parse
/// as records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    timestamp: DateTime<Utc>,
    params: Map<String, Value>,
    metrics: Map<String, Value>,
    #[serde(default)]
    history: Option<Map<String, Value>>,
    #[serde(default)]
    model_paths: Option<BTreeMap<String, String>>,
}

impl RunRecord {
    /// Create a builder for assembling a run record.
    #[must_use]
    pub fn builder() -> RunRecordBuilder {
        RunRecordBuilder::new()
    }

    /// Get the time the run was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get the hyperparameters used for this run.
    #[must_use]
    pub const fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Get the final evaluation metrics.
    #[must_use]
    pub const fn metrics(&self) -> &Map<String, Value> {
        &self.metrics
    }

    /// Get the per-epoch training history, if one was recorded.
    #[must_use]
    pub const fn history(&self) -> Option<&Map<String, Value>> {
        self.history.as_ref()
    }

    /// Get the saved model paths by role ("final", "best", ...), if any.
    #[must_use]
    pub const fn model_paths(&self) -> Option<&BTreeMap<String, String>> {
        self.model_paths.as_ref()
    }

    /// Look up a single hyperparameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Look up a single metric by name.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&Value> {
        self.metrics.get(name)
    }

    /// Look up the per-epoch series recorded for a metric.
    #[must_use]
    pub fn epoch_series(&self, metric: &str) -> Option<&Vec<Value>> {
        self.history.as_ref()?.get(metric)?.as_array()
    }

    /// Look up a saved model path by role.
    #[must_use]
    pub fn model_path(&self, role: &str) -> Option<&str> {
        self.model_paths.as_ref()?.get(role).map(String::as_str)
    }
}

/// Builder for `RunRecord`.
///
/// Every inserted value passes through the codec, so construction never
/// fails: unencodable values degrade to their debug-string form and
/// non-finite floats, param and metric alike, to `"NaN"` / `"inf"` /
/// `"-inf"`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    timestamp: DateTime<Utc>,
    params: Map<String, Value>,
    metrics: Map<String, Value>,
    history: Option<Map<String, Value>>,
    model_paths: Option<BTreeMap<String, String>>,
}

impl RunRecordBuilder {
    /// Create an empty builder stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            params: Map::new(),
            metrics: Map::new(),
            history: None,
            model_paths: None,
        }
    }

    /// Set a custom timestamp.
    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Record a hyperparameter.
    ///
    /// A bare non-finite float degrades to its display string, matching
    /// the metric path.
    #[must_use]
    pub fn param<V>(mut self, name: impl Into<String>, value: V) -> Self
    where
        V: Serialize + fmt::Debug,
    {
        self.params.insert(name.into(), codec::safe_value(&value));
        self
    }

    /// Record a final metric value.
    ///
    /// Non-finite values are stored as their display strings rather than
    /// the null `serde_json` would produce.
    #[must_use]
    pub fn metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), codec::safe_f64(value));
        self
    }

    /// Record a non-float metric (a label, a count, a confusion matrix).
    #[must_use]
    pub fn metric_value<V>(mut self, name: impl Into<String>, value: V) -> Self
    where
        V: Serialize + fmt::Debug,
    {
        self.metrics.insert(name.into(), codec::safe_value(&value));
        self
    }

    /// Record the per-epoch series for a metric, in epoch order.
    #[must_use]
    pub fn epoch_series(mut self, metric: impl Into<String>, values: &[f64]) -> Self {
        let series = values.iter().copied().map(codec::safe_f64).collect();
        self.history
            .get_or_insert_with(Map::new)
            .insert(metric.into(), Value::Array(series));
        self
    }

    /// Record the path of a saved model artifact under a role name.
    #[must_use]
    pub fn model_path(mut self, role: impl Into<String>, path: impl Into<String>) -> Self {
        self.model_paths
            .get_or_insert_with(BTreeMap::new)
            .insert(role.into(), path.into());
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord {
        RunRecord {
            timestamp: self.timestamp,
            params: self.params,
            metrics: self.metrics,
            history: self.history,
            model_paths: self.model_paths,
        }
    }
}

impl Default for RunRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
