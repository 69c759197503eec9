//! Helpers for enumerated-state and condition families.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kstate_model::Metric;

/// Condition statuses in the order they are emitted.
pub const CONDITION_STATUSES: [&str; 3] = ["True", "False", "Unknown"];

/// What an enum family does when the source field is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Emit no samples at all.
    Skip,
    /// Emit every value with 0.
    EmitZeros,
}

/// One sample per possible value, 1 for the current one and 0 for the rest.
pub fn enum_state_metrics(
    label: &str,
    current: &str,
    values: &[&str],
    policy: EmptyPolicy,
) -> Vec<Metric> {
    if current.is_empty() && policy == EmptyPolicy::Skip {
        return Vec::new();
    }
    values
        .iter()
        .map(|v| Metric::with_labels([(label, *v)], bool_f64(*v == current)))
        .collect()
}

/// Three samples (`true`, `false`, `unknown`) under `key`, 1 for the matching status.
pub fn condition_metrics(key: &str, status: &str) -> Vec<Metric> {
    CONDITION_STATUSES
        .iter()
        .map(|s| Metric::with_labels([(key, s.to_lowercase())], bool_f64(*s == status)))
        .collect()
}

/// Like [`condition_metrics`] with a leading `condition` label.
pub fn status_condition_metrics(condition: &str, status: &str) -> Vec<Metric> {
    CONDITION_STATUSES
        .iter()
        .map(|s| {
            Metric::with_labels(
                [("condition", condition.to_string()), ("status", s.to_lowercase())],
                bool_f64(*s == status),
            )
        })
        .collect()
}

pub fn bool_f64(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// The resource version as a sample, when it is numeric.
pub fn resource_version_metric(rv: Option<&str>) -> Vec<Metric> {
    rv.and_then(|rv| rv.parse::<f64>().ok())
        .map(|v| vec![Metric::value_only(v)])
        .unwrap_or_default()
}

pub fn unix_seconds(t: &Time) -> f64 {
    t.0.timestamp() as f64
}

/// A unix timestamp sample, or nothing for unset times.
pub fn timestamp_metric(t: Option<&Time>) -> Vec<Metric> {
    t.map(|t| vec![Metric::value_only(unix_seconds(t))])
        .unwrap_or_default()
}
