use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::metric::{Metric, MetricType};

/// All samples one generator produced for one object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Family {
    pub name: String,
    pub metric_type: MetricType,
    pub metrics: Vec<Metric>,
}

impl Family {
    pub fn new(name: impl Into<String>, metric_type: MetricType, metrics: Vec<Metric>) -> Self {
        Self {
            name: name.into(),
            metric_type,
            metrics,
        }
    }

    /// Render every sample in text exposition format, one line each.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for m in &self.metrics {
            out.push_str(&self.name);
            if !m.label_keys.is_empty() {
                out.push('{');
                for (i, (k, v)) in m.label_keys.iter().zip(&m.label_values).enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{k}=\"{}\"", escape_label_value(v));
                }
                out.push('}');
            }
            out.push(' ');
            out.push_str(&format_value(m.value));
            out.push('\n');
        }
        out
    }
}

/// Escape `\`, `"` and newlines in a label value.
pub fn escape_label_value(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Shortest float representation; switches to exponent form outside `[1e-4, 1e6)`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{v:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return v.to_string();
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }
    v.to_string()
}
