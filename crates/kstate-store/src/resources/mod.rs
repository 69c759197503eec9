//! Every resource type this exporter can watch, behind one type-erased seam.

mod certificatesigningrequest;
mod clusterrole;
mod clusterrolebinding;
mod configmap;
mod cronjob;
mod customresourcedefinition;
mod daemonset;
mod deployment;
mod endpoint;
mod horizontalpodautoscaler;
mod ingress;
mod job;
mod lease;
mod limitrange;
mod namespace;
mod networkpolicy;
mod node;
mod persistentvolume;
mod persistentvolumeclaim;
mod pod;
mod poddisruptionbudget;
mod replicaset;
mod replicationcontroller;
mod resourcequota;
mod role;
mod rolebinding;
mod secret;
mod service;
mod serviceaccount;
mod statefulset;
mod storageclass;

use std::{fmt::Debug, sync::Arc};

use k8s_openapi::{
    NamespaceResourceScope,
    api::{
        apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet},
        autoscaling::v2::HorizontalPodAutoscaler,
        batch::v1::{CronJob, Job},
        certificates::v1::CertificateSigningRequest,
        coordination::v1::Lease,
        core::v1::{
            ConfigMap, Endpoints, LimitRange, Namespace, Node, PersistentVolume,
            PersistentVolumeClaim, Pod, ReplicationController, ResourceQuota, Secret, Service,
            ServiceAccount,
        },
        networking::v1::{Ingress, NetworkPolicy},
        policy::v1::PodDisruptionBudget,
        rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding},
        storage::v1::StorageClass,
    },
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
    serde::de::DeserializeOwned,
};
use kstate_core::{
    FamilyGenerator, FamilyGeneratorFilter, MetricsSink, MetricsStore, MultiStoreWriter,
    ObjectKey, ResourceCatalog, WatchMetrics, filter_generators,
};
use kstate_model::ALL_NAMESPACES;
use kube::{Api, Client, Resource};

pub use crate::common::AllowedKeys;
use crate::reflector::Reflector;

/// Builds the list/watch client of a resource for one namespace (`""` for all).
pub(crate) type ApiFn<K> = fn(Client, &str) -> Api<K>;

/// Inputs shared by every resource while wiring stores and reflectors.
pub(crate) struct BuildContext<'a> {
    pub namespaces: &'a [String],
    pub field_selector: &'a str,
    pub filter: &'a dyn FamilyGeneratorFilter,
    pub telemetry: Arc<dyn WatchMetrics>,
}

/// A watchable resource type, independent of its Rust object type.
pub(crate) trait ResourceKind: Send + Sync {
    /// Plural resource name, as used on the command line.
    fn name(&self) -> &'static str;

    fn namespaced(&self) -> bool;

    /// One store and reflector per watch target, gathered under one writer.
    fn build(&self, allowed: &AllowedKeys, ctx: &BuildContext<'_>) -> (MultiStoreWriter, Vec<Reflector>);
}

struct Kind<K> {
    name: &'static str,
    namespaced: bool,
    generators: fn(&AllowedKeys) -> Vec<FamilyGenerator<K>>,
    api: ApiFn<K>,
}

impl<K> Kind<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    fn namespaced(name: &'static str, generators: fn(&AllowedKeys) -> Vec<FamilyGenerator<K>>) -> Self {
        Self {
            name,
            namespaced: true,
            generators,
            api: |client, ns| {
                if ns == ALL_NAMESPACES {
                    Api::all(client)
                } else {
                    Api::namespaced(client, ns)
                }
            },
        }
    }
}

impl<K> Kind<K>
where
    K: Resource,
    K::DynamicType: Default,
{
    fn cluster(name: &'static str, generators: fn(&AllowedKeys) -> Vec<FamilyGenerator<K>>) -> Self {
        Self {
            name,
            namespaced: false,
            generators,
            api: |client, _| Api::all(client),
        }
    }
}

impl<K> ResourceKind for Kind<K>
where
    K: Resource + Clone + DeserializeOwned + Debug + ObjectKey + Send + Sync + 'static,
    K::DynamicType: Default,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn namespaced(&self) -> bool {
        self.namespaced
    }

    fn build(&self, allowed: &AllowedKeys, ctx: &BuildContext<'_>) -> (MultiStoreWriter, Vec<Reflector>) {
        let generators = filter_generators(ctx.filter, (self.generators)(allowed));
        let targets: Vec<String> = if self.namespaced {
            ctx.namespaces.to_vec()
        } else {
            vec![ALL_NAMESPACES.to_string()]
        };

        let mut sinks: Vec<Arc<dyn MetricsSink>> = Vec::with_capacity(targets.len());
        let mut reflectors = Vec::with_capacity(targets.len());
        for namespace in targets {
            let store = MetricsStore::new(&generators);
            sinks.push(Arc::new(store.clone()));
            reflectors.push(Reflector::new(
                self.name,
                namespace,
                ctx.field_selector.to_string(),
                self.api,
                store,
                Arc::clone(&ctx.telemetry),
            ));
        }
        (MultiStoreWriter::new(self.name, sinks), reflectors)
    }
}

/// All supported resources, sorted by name.
pub(crate) fn kinds() -> Vec<Box<dyn ResourceKind>> {
    vec![
        Box::new(Kind::<CertificateSigningRequest>::cluster(
            "certificatesigningrequests",
            certificatesigningrequest::generators,
        )),
        Box::new(Kind::<ClusterRoleBinding>::cluster(
            "clusterrolebindings",
            clusterrolebinding::generators,
        )),
        Box::new(Kind::<ClusterRole>::cluster("clusterroles", clusterrole::generators)),
        Box::new(Kind::<ConfigMap>::namespaced("configmaps", configmap::generators)),
        Box::new(Kind::<CronJob>::namespaced("cronjobs", cronjob::generators)),
        Box::new(Kind::<CustomResourceDefinition>::cluster(
            "customresourcedefinitions",
            customresourcedefinition::generators,
        )),
        Box::new(Kind::<DaemonSet>::namespaced("daemonsets", daemonset::generators)),
        Box::new(Kind::<Deployment>::namespaced("deployments", deployment::generators)),
        Box::new(Kind::<Endpoints>::namespaced("endpoints", endpoint::generators)),
        Box::new(Kind::<HorizontalPodAutoscaler>::namespaced(
            "horizontalpodautoscalers",
            horizontalpodautoscaler::generators,
        )),
        Box::new(Kind::<Ingress>::namespaced("ingresses", ingress::generators)),
        Box::new(Kind::<Job>::namespaced("jobs", job::generators)),
        // Leases are watched cluster-wide whatever the namespace selection.
        Box::new(Kind::<Lease>::cluster("leases", |_| lease::generators())),
        Box::new(Kind::<LimitRange>::namespaced("limitranges", |_| limitrange::generators())),
        Box::new(Kind::<Namespace>::cluster("namespaces", namespace::generators)),
        Box::new(Kind::<NetworkPolicy>::namespaced("networkpolicies", networkpolicy::generators)),
        Box::new(Kind::<Node>::cluster("nodes", node::generators)),
        Box::new(Kind::<PersistentVolumeClaim>::namespaced(
            "persistentvolumeclaims",
            persistentvolumeclaim::generators,
        )),
        Box::new(Kind::<PersistentVolume>::cluster(
            "persistentvolumes",
            persistentvolume::generators,
        )),
        Box::new(Kind::<PodDisruptionBudget>::namespaced(
            "poddisruptionbudgets",
            poddisruptionbudget::generators,
        )),
        Box::new(Kind::<Pod>::namespaced("pods", pod::generators)),
        Box::new(Kind::<ReplicaSet>::namespaced("replicasets", replicaset::generators)),
        Box::new(Kind::<ReplicationController>::namespaced(
            "replicationcontrollers",
            |_| replicationcontroller::generators(),
        )),
        Box::new(Kind::<ResourceQuota>::namespaced("resourcequotas", resourcequota::generators)),
        Box::new(Kind::<RoleBinding>::namespaced("rolebindings", rolebinding::generators)),
        Box::new(Kind::<Role>::namespaced("roles", role::generators)),
        Box::new(Kind::<Secret>::namespaced("secrets", secret::generators)),
        Box::new(Kind::<ServiceAccount>::namespaced("serviceaccounts", serviceaccount::generators)),
        Box::new(Kind::<Service>::namespaced("services", service::generators)),
        Box::new(Kind::<StatefulSet>::namespaced("statefulsets", statefulset::generators)),
        Box::new(Kind::<StorageClass>::cluster("storageclasses", storageclass::generators)),
    ]
}

/// Names of every supported resource.
pub fn catalog() -> ResourceCatalog {
    ResourceCatalog::new(kinds().iter().map(|k| k.name()))
}

#[cfg(test)]
mod tests {
    use kstate_core::{CompositeFamilyGeneratorFilter, NoopMetrics};

    use super::*;

    #[test]
    fn catalog_lists_every_kind_once() {
        let catalog = catalog();
        assert_eq!(catalog.names().len(), 31);
        for name in [
            "pods",
            "customresourcedefinitions",
            "roles",
            "clusterrolebindings",
            "resourcequotas",
            "limitranges",
            "replicationcontrollers",
            "storageclasses",
            "ingresses",
            "horizontalpodautoscalers",
            "networkpolicies",
        ] {
            assert!(catalog.contains(name), "{name} missing");
        }
        assert!(!catalog.contains("ingressclasses"));
    }

    #[test]
    fn kinds_are_sorted() {
        let names: Vec<&str> = kinds().iter().map(|k| k.name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn namespaced_kinds_get_one_reflector_per_namespace() {
        let namespaces = vec!["ns1".to_string(), "ns2".to_string()];
        let filter = CompositeFamilyGeneratorFilter::default();
        let ctx = BuildContext {
            namespaces: &namespaces,
            field_selector: "",
            filter: &filter,
            telemetry: Arc::new(NoopMetrics),
        };
        let all = kinds();
        let find = |name: &str| all.iter().find(|k| k.name() == name);

        let pods = find("pods").map(|k| k.build(&AllowedKeys::default(), &ctx));
        let (writer, reflectors) = pods.unwrap();
        assert_eq!(writer.resource(), "pods");
        let targets: Vec<&str> = reflectors.iter().map(|r| r.namespace()).collect();
        assert_eq!(targets, vec!["ns1", "ns2"]);

        let (_, reflectors) = find("nodes")
            .map(|k| k.build(&AllowedKeys::default(), &ctx))
            .unwrap();
        assert_eq!(reflectors.len(), 1);
        assert_eq!(reflectors[0].namespace(), ALL_NAMESPACES);

        let leases = find("leases").unwrap();
        assert!(!leases.namespaced());
        assert!(!find("storageclasses").unwrap().namespaced());
        assert!(!find("clusterrolebindings").unwrap().namespaced());
        assert!(find("horizontalpodautoscalers").unwrap().namespaced());
    }
}
