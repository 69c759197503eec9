use std::sync::Arc;

use kstate_core::{
    AllowList, FamilyGeneratorFilter, MetricsWriter, NoopMetrics, OptInFilter, WatchMetrics,
    exclude_namespaces_selector, merge_field_selectors, resolve_allow_list,
    resolve_enabled_resources,
};
use kstate_model::{LabelsAllowList, NamespaceList, ResourceSet};
use kube::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::{
    error::StoreError,
    reflector::Reflector,
    resources::{AllowedKeys, BuildContext, catalog, kinds},
};

/// Resolves the exporter configuration into stores and their reflectors.
///
/// Nothing talks to the API server until [`Wiring::spawn`].
pub struct Builder {
    resources: ResourceSet,
    namespaces: NamespaceList,
    namespaces_denylist: Vec<String>,
    field_selector: String,
    allow_labels: LabelsAllowList,
    allow_annotations: LabelsAllowList,
    filter: Arc<dyn FamilyGeneratorFilter>,
    telemetry: Arc<dyn WatchMetrics>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Every resource, every namespace, opt-in families disabled.
    pub fn new() -> Self {
        Self {
            resources: ResourceSet::default(),
            namespaces: NamespaceList::default(),
            namespaces_denylist: Vec::new(),
            field_selector: String::new(),
            allow_labels: LabelsAllowList::default(),
            allow_annotations: LabelsAllowList::default(),
            filter: Arc::new(OptInFilter::default()),
            telemetry: Arc::new(NoopMetrics),
        }
    }

    /// Empty means every resource of the catalog.
    #[inline]
    pub fn with_enabled_resources(mut self, resources: ResourceSet) -> Self {
        self.resources = resources;
        self
    }

    #[inline]
    pub fn with_namespaces(mut self, namespaces: NamespaceList) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Namespaces excluded from an all-namespace watch.
    #[inline]
    pub fn with_namespaces_denylist(mut self, denylist: Vec<String>) -> Self {
        self.namespaces_denylist = denylist;
        self
    }

    #[inline]
    pub fn with_field_selector(mut self, selector: impl Into<String>) -> Self {
        self.field_selector = selector.into();
        self
    }

    #[inline]
    pub fn with_allow_labels(mut self, list: LabelsAllowList) -> Self {
        self.allow_labels = list;
        self
    }

    #[inline]
    pub fn with_allow_annotations(mut self, list: LabelsAllowList) -> Self {
        self.allow_annotations = list;
        self
    }

    /// Replaces the default filter, which only drops opt-in families.
    #[inline]
    pub fn with_family_filter(mut self, filter: Arc<dyn FamilyGeneratorFilter>) -> Self {
        self.filter = filter;
        self
    }

    #[inline]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn WatchMetrics>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Validate the configuration and build one store per resource and watch target.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self) -> Result<Wiring, StoreError> {
        let catalog = catalog();
        let requested = if self.resources.is_empty() {
            catalog.names().to_vec()
        } else {
            self.resources.as_slice().to_vec()
        };
        let enabled = resolve_enabled_resources(&catalog, &requested)?;
        info!(resources = %enabled.join(","), "active resources");

        let labels = resolve_allow_list(&catalog, &enabled, &self.allow_labels.0)
            .map_err(|source| StoreError::AllowList { list: "labels", source })?;
        let annotations = resolve_allow_list(&catalog, &enabled, &self.allow_annotations.0)
            .map_err(|source| StoreError::AllowList { list: "annotations", source })?;

        let namespaces = self.namespaces.watch_targets();
        let field_selector = self.field_selector()?;
        info!(namespaces = ?namespaces, field_selector = %field_selector, "watch targets");

        let ctx = BuildContext {
            namespaces: &namespaces,
            field_selector: &field_selector,
            filter: self.filter.as_ref(),
            telemetry: Arc::clone(&self.telemetry),
        };

        let mut writers = Vec::with_capacity(enabled.len());
        let mut reflectors = Vec::new();
        for kind in kinds().iter().filter(|k| enabled.iter().any(|e| e == k.name())) {
            let allowed = allowed_keys(kind.name(), &labels, &annotations);
            let (writer, mut refl) = kind.build(&allowed, &ctx);
            debug!(resource = kind.name(), reflectors = refl.len(), "resource wired");
            writers.push(writer);
            reflectors.append(&mut refl);
        }

        Ok(Wiring {
            writer: MetricsWriter::new(writers),
            reflectors,
        })
    }

    fn field_selector(&self) -> Result<String, StoreError> {
        if self.namespaces_denylist.is_empty() {
            return Ok(merge_field_selectors(&[self.field_selector.as_str()]));
        }
        if !self.namespaces.is_all() {
            return Err(StoreError::DenylistWithNamespaces);
        }
        let exclude = exclude_namespaces_selector(&self.namespaces_denylist);
        Ok(merge_field_selectors(&[self.field_selector.clone(), exclude]))
    }

    /// [`Builder::build`], then run every reflector until `cancel` fires.
    pub fn start(&self, client: Client, cancel: &CancellationToken) -> Result<MetricsWriter, StoreError> {
        let (writer, handles) = self.build()?.spawn(client, cancel);
        info!(reflectors = handles.len(), "reflectors started");
        Ok(writer)
    }
}

fn allowed_keys(resource: &str, labels: &AllowList, annotations: &AllowList) -> AllowedKeys {
    AllowedKeys {
        labels: labels.get(resource).cloned().unwrap_or_default(),
        annotations: annotations.get(resource).cloned().unwrap_or_default(),
    }
}

/// Stores and their reflectors, ready to run.
pub struct Wiring {
    pub writer: MetricsWriter,
    pub reflectors: Vec<Reflector>,
}

impl Wiring {
    /// Start every reflector on the runtime; the writer serves scrapes meanwhile.
    pub fn spawn(self, client: Client, cancel: &CancellationToken) -> (MetricsWriter, Vec<JoinHandle<()>>) {
        let handles = self
            .reflectors
            .into_iter()
            .map(|r| tokio::spawn(r.run(client.clone(), cancel.child_token())))
            .collect();
        (self.writer, handles)
    }
}
