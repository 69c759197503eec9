//! Prometheus self-telemetry for the exporter.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of [`kstate_core::WatchMetrics`]
//! describing the exporter itself, kept apart from the exported object metrics.
//!
//! ## Example
//! ```rust
//! use kstate_core::{WatchMetrics, WatchOutcome};
//! use kstate_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new("0.0.1")?;
//! metrics.record_list("pods", WatchOutcome::Success);
//! metrics.set_objects("pods", 12);
//!
//! let text = metrics.encode()?;
//! assert!(text.contains("kube_state_metrics_objects{resource=\"pods\"} 12"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `kube_state_metrics_list_total{resource, result}` - Counter
//! - `kube_state_metrics_watch_total{resource, result}` - Counter
//! - `kube_state_metrics_objects{resource}` - Gauge
//! - `kube_state_metrics_build_info{version}` - Gauge
//!
//! ## HTTP Server
//! This crate does NOT serve anything; the api crate mounts [`PrometheusMetrics::encode`]
//! on the telemetry listener.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Error, Registry, TextEncoder};
