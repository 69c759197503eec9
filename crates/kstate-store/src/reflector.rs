use std::{fmt::Debug, mem, sync::Arc};

use futures::{StreamExt, future::BoxFuture};
use k8s_openapi::serde::de::DeserializeOwned;
use kstate_core::{MetricsStore, ObjectKey, WatchMetrics, WatchOutcome};
use kube::{
    Client, Resource,
    runtime::{WatchStreamExt, watcher},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::resources::ApiFn;

type RunFn = Box<dyn FnOnce(Client, CancellationToken) -> BoxFuture<'static, ()> + Send>;

/// List/watch loop of one resource in one namespace, feeding one store.
///
/// Built without a client so the wiring can be inspected before anything
/// connects; [`Reflector::run`] starts the watch.
pub struct Reflector {
    resource: &'static str,
    namespace: String,
    run: RunFn,
}

impl Reflector {
    pub(crate) fn new<K>(
        resource: &'static str,
        namespace: String,
        field_selector: String,
        api: ApiFn<K>,
        store: MetricsStore<K>,
        telemetry: Arc<dyn WatchMetrics>,
    ) -> Self
    where
        K: Resource + Clone + DeserializeOwned + Debug + ObjectKey + Send + Sync + 'static,
        K::DynamicType: Default,
    {
        let target = namespace.clone();
        let run: RunFn = Box::new(move |client, cancel| {
            Box::pin(async move {
                let mut config = watcher::Config::default();
                if !field_selector.is_empty() {
                    config = config.fields(&field_selector);
                }
                let sync = StoreSync::new(resource, store, telemetry);
                watch(api(client, &target), config, sync, cancel).await;
            })
        });
        Self {
            resource,
            namespace,
            run,
        }
    }

    pub fn resource(&self) -> &str {
        self.resource
    }

    /// Watched namespace, empty for all namespaces.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Watch until `cancel` fires. Failures are retried with backoff, never returned.
    pub async fn run(self, client: Client, cancel: CancellationToken) {
        info!(resource = self.resource, namespace = %self.namespace, "starting reflector");
        (self.run)(client, cancel).await;
        debug!(resource = self.resource, namespace = %self.namespace, "reflector stopped");
    }
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("resource", &self.resource)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

async fn watch<K>(
    api: kube::Api<K>,
    config: watcher::Config,
    mut sync: StoreSync<K>,
    cancel: CancellationToken,
) where
    K: Resource + Clone + DeserializeOwned + Debug + ObjectKey + Send + Sync + 'static,
{
    let mut stream = watcher(api, config).default_backoff().boxed();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = stream.next() => match next {
                Some(Ok(event)) => sync.apply(event),
                Some(Err(err)) => sync.fail(&err),
                None => break,
            },
        }
    }
}

/// Applies watch events to a store and reports them.
struct StoreSync<K> {
    resource: &'static str,
    store: MetricsStore<K>,
    telemetry: Arc<dyn WatchMetrics>,
    /// Objects of a relist in progress.
    pending: Vec<K>,
    /// A watch stream is open and already counted.
    watching: bool,
}

impl<K: ObjectKey + 'static> StoreSync<K> {
    fn new(resource: &'static str, store: MetricsStore<K>, telemetry: Arc<dyn WatchMetrics>) -> Self {
        Self {
            resource,
            store,
            telemetry,
            pending: Vec::new(),
            watching: false,
        }
    }

    fn apply(&mut self, event: watcher::Event<K>) {
        match event {
            watcher::Event::Init => {
                self.pending.clear();
                self.watching = false;
            }
            watcher::Event::InitApply(obj) => self.pending.push(obj),
            watcher::Event::InitDone => {
                let objects = mem::take(&mut self.pending);
                self.store.replace(&objects);
                self.telemetry.record_list(self.resource, WatchOutcome::Success);
                debug!(resource = self.resource, objects = objects.len(), "relist applied");
                // the watcher opens a watch right after every completed list
                self.watch_established();
            }
            watcher::Event::Apply(obj) => {
                self.watch_established();
                self.store.add(&obj);
            }
            watcher::Event::Delete(obj) => {
                self.watch_established();
                self.store.delete(&obj);
            }
        }
    }

    /// Counts one watch request per stream, not per delivered event.
    fn watch_established(&mut self) {
        if !self.watching {
            self.watching = true;
            self.telemetry.record_watch(self.resource, WatchOutcome::Success);
        }
    }

    fn fail(&mut self, err: &watcher::Error) {
        match err {
            watcher::Error::InitialListFailed(_) => {
                self.telemetry.record_list(self.resource, WatchOutcome::Error)
            }
            _ => self.telemetry.record_watch(self.resource, WatchOutcome::Error),
        }
        self.watching = false;
        warn!(resource = self.resource, error = %err, "watch failed, retrying");
    }
}
