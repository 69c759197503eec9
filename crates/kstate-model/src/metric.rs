use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Prometheus metric type of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricType {
    #[default]
    Gauge,
    Counter,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gauge" => Ok(MetricType::Gauge),
            "counter" => Ok(MetricType::Counter),
            _ => Err(ModelError::InvalidMetricType(s.to_string())),
        }
    }
}

/// Stability marker of a family.
///
/// Only `Stable` families advertise their level in the `# HELP` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StabilityLevel {
    #[default]
    Alpha,
    Beta,
    Stable,
}

impl StabilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityLevel::Alpha => "ALPHA",
            StabilityLevel::Beta => "BETA",
            StabilityLevel::Stable => "STABLE",
        }
    }
}

impl fmt::Display for StabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sample: parallel label keys/values and a value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metric {
    pub label_keys: Vec<String>,
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Metric {
    /// Build a sample, rejecting mismatched key/value lists.
    pub fn new(
        label_keys: Vec<String>,
        label_values: Vec<String>,
        value: f64,
    ) -> Result<Self, ModelError> {
        if label_keys.len() != label_values.len() {
            return Err(ModelError::LabelLengthMismatch {
                keys: label_keys.len(),
                values: label_values.len(),
            });
        }
        Ok(Self {
            label_keys,
            label_values,
            value,
        })
    }

    /// Sample without labels of its own (identity labels are merged in later).
    pub fn value_only(value: f64) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    /// Sample from `(key, value)` pairs; cannot be mismatched.
    pub fn with_labels<K, V>(pairs: impl IntoIterator<Item = (K, V)>, value: f64) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (label_keys, label_values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            label_keys,
            label_values,
            value,
        }
    }

    /// Look up a label value by key.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.label_keys
            .iter()
            .position(|k| k == key)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_lengths() {
        let err = Metric::new(vec!["a".into(), "b".into()], vec!["1".into()], 1.0).unwrap_err();
        assert_eq!(err, ModelError::LabelLengthMismatch { keys: 2, values: 1 });
    }

    #[test]
    fn with_labels_keeps_order() {
        let m = Metric::with_labels([("condition", "Ready"), ("status", "true")], 1.0);
        assert_eq!(m.label_keys, vec!["condition", "status"]);
        assert_eq!(m.label("status"), Some("true"));
        assert_eq!(m.label("missing"), None);
    }

    #[test]
    fn metric_type_parse_and_display() {
        assert_eq!("Counter".parse::<MetricType>().unwrap(), MetricType::Counter);
        assert_eq!(MetricType::Gauge.to_string(), "gauge");
        assert!("histogram".parse::<MetricType>().is_err());
    }

    #[test]
    fn stability_serde_is_uppercase() {
        let json = serde_json::to_string(&StabilityLevel::Stable).unwrap();
        assert_eq!(json, r#""STABLE""#);
    }
}
