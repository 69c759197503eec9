use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use k8s_openapi::{Metadata, apimachinery::pkg::apis::meta::v1::ObjectMeta};

use crate::generator::{ComposedFn, FamilyGenerator, compose_metric_gen_funcs, extract_metric_family_headers};

/// Stable key of a watched object.
pub trait ObjectKey {
    fn object_key(&self) -> String;
}

impl<K> ObjectKey for K
where
    K: Metadata<Ty = ObjectMeta>,
{
    /// The UID, or `namespace/name` for objects that have none yet.
    fn object_key(&self) -> String {
        let meta = self.metadata();
        match &meta.uid {
            Some(uid) if !uid.is_empty() => uid.clone(),
            _ => format!(
                "{}/{}",
                meta.namespace.as_deref().unwrap_or_default(),
                meta.name.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Anything that can write rendered families into an exposition buffer.
pub trait MetricsSink: Send + Sync {
    /// Family headers, in family order.
    fn headers(&self) -> &[String];

    /// Append the samples of every object to `out[i]` for family `i`.
    ///
    /// All families are written from the same view of the objects.
    fn write_families(&self, out: &mut [String]);

    /// Number of objects currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every header followed by the samples of all objects for that family.
    fn write_all(&self, out: &mut String) {
        let mut families = vec![String::new(); self.headers().len()];
        self.write_families(&mut families);
        for (header, samples) in self.headers().iter().zip(&families) {
            out.push_str(header);
            out.push('\n');
            out.push_str(samples);
        }
    }
}

struct MetricsStoreInner {
    /// Rendered families indexed by object key, one string per family.
    metrics: BTreeMap<String, Vec<String>>,
}

/// Rendered metrics of every object seen by one watcher.
///
/// Objects are rendered once on add/update; scrapes only concatenate strings.
pub struct MetricsStore<K> {
    inner: Arc<RwLock<MetricsStoreInner>>,
    headers: Arc<[String]>,
    generate: ComposedFn<K>,
}

impl<K> Clone for MetricsStore<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            headers: Arc::clone(&self.headers),
            generate: Arc::clone(&self.generate),
        }
    }
}

impl<K: ObjectKey + 'static> MetricsStore<K> {
    /// Create an empty store for the given generators.
    pub fn new(generators: &[FamilyGenerator<K>]) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsStoreInner {
                metrics: BTreeMap::new(),
            })),
            headers: extract_metric_family_headers(generators).into(),
            generate: compose_metric_gen_funcs(generators),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MetricsStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MetricsStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, obj: &K) -> Vec<String> {
        (self.generate)(obj).iter().map(|f| f.render()).collect()
    }

    /// Render and store the object's families (called on add events).
    pub fn add(&self, obj: &K) {
        let rendered = self.render(obj);
        self.write().metrics.insert(obj.object_key(), rendered);
    }

    /// Same as [`MetricsStore::add`].
    pub fn update(&self, obj: &K) {
        self.add(obj);
    }

    /// Drop the object's families (called on delete events).
    pub fn delete(&self, obj: &K) {
        self.write().metrics.remove(&obj.object_key());
    }

    /// Replace the whole content with the given objects (called after a relist).
    pub fn replace<'a, I>(&self, objects: I)
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let fresh: BTreeMap<String, Vec<String>> = objects
            .into_iter()
            .map(|o| (o.object_key(), self.render(o)))
            .collect();
        self.write().metrics = fresh;
    }
}

impl<K: ObjectKey + 'static> MetricsSink for MetricsStore<K> {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn write_families(&self, out: &mut [String]) {
        let inner = self.read();
        for families in inner.metrics.values() {
            for (slot, family) in out.iter_mut().zip(families) {
                slot.push_str(family);
            }
        }
    }

    fn len(&self) -> usize {
        self.read().metrics.len()
    }
}
