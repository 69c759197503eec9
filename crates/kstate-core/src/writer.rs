use std::sync::Arc;

use crate::store::MetricsSink;

/// Stores of one resource type (one per watched namespace) written as one.
///
/// All stores must share the same headers; each header is written once and
/// followed by the samples of every store.
#[derive(Clone)]
pub struct MultiStoreWriter {
    resource: String,
    stores: Vec<Arc<dyn MetricsSink>>,
}

impl MultiStoreWriter {
    pub fn new(resource: impl Into<String>, stores: Vec<Arc<dyn MetricsSink>>) -> Self {
        Self {
            resource: resource.into(),
            stores,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl MetricsSink for MultiStoreWriter {
    fn headers(&self) -> &[String] {
        self.stores.first().map(|s| s.headers()).unwrap_or_default()
    }

    fn write_families(&self, out: &mut [String]) {
        for store in &self.stores {
            store.write_families(out);
        }
    }

    fn len(&self) -> usize {
        self.stores.iter().map(|s| s.len()).sum()
    }
}

/// Every resource writer of the process, in resource order.
#[derive(Clone, Default)]
pub struct MetricsWriter {
    writers: Vec<MultiStoreWriter>,
}

impl MetricsWriter {
    pub fn new(writers: Vec<MultiStoreWriter>) -> Self {
        Self { writers }
    }

    pub fn writers(&self) -> &[MultiStoreWriter] {
        &self.writers
    }

    /// Full exposition text for a scrape.
    pub fn write_all(&self) -> String {
        let mut out = String::new();
        for w in &self.writers {
            w.write_all(&mut out);
        }
        out
    }

    /// Objects held per resource.
    pub fn object_counts(&self) -> Vec<(&str, usize)> {
        self.writers.iter().map(|w| (w.resource(), w.len())).collect()
    }
}
