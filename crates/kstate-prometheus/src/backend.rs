use kstate_core::{WatchMetrics, WatchOutcome};
use prometheus::{IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

/// Exporter self-metrics backed by a private [`Registry`].
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    list_total: IntCounterVec,
    watch_total: IntCounterVec,
    objects: IntGaugeVec,
}

impl PrometheusMetrics {
    pub fn new(version: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let list_total = IntCounterVec::new(
            Opts::new(
                "kube_state_metrics_list_total",
                "Number of total resource list in kube-state-metrics",
            ),
            &["resource", "result"],
        )?;
        let watch_total = IntCounterVec::new(
            Opts::new(
                "kube_state_metrics_watch_total",
                "Number of total resource watches in kube-state-metrics",
            ),
            &["resource", "result"],
        )?;
        let objects = IntGaugeVec::new(
            Opts::new(
                "kube_state_metrics_objects",
                "Number of objects currently held per resource",
            ),
            &["resource"],
        )?;
        let build_info = IntGaugeVec::new(
            Opts::new(
                "kube_state_metrics_build_info",
                "A metric with a constant '1' value labeled by version",
            ),
            &["version"],
        )?;

        registry.register(Box::new(list_total.clone()))?;
        registry.register(Box::new(watch_total.clone()))?;
        registry.register(Box::new(objects.clone()))?;
        registry.register(Box::new(build_info.clone()))?;
        build_info.with_label_values(&[version]).set(1);

        Ok(Self {
            registry,
            list_total,
            watch_total,
            objects,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn set_objects(&self, resource: &str, count: usize) {
        self.objects
            .with_label_values(&[resource])
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition of every registered metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.gather())
    }
}

impl WatchMetrics for PrometheusMetrics {
    fn record_list(&self, resource: &str, outcome: WatchOutcome) {
        self.list_total
            .with_label_values(&[resource, outcome.as_str()])
            .inc();
    }

    fn record_watch(&self, resource: &str, outcome: WatchOutcome) {
        self.watch_total
            .with_label_values(&[resource, outcome.as_str()])
            .inc();
    }
}
