use k8s_openapi::api::apps::v1::ReplicaSet;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
    opt_value, owner_metrics, value_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<ReplicaSet>> {
    with_identity(
        vec![
            created_family("replicaset", StabilityLevel::Alpha),
            value_family(
                "kube_replicaset_status_replicas",
                "The number of replicas per ReplicaSet.",
                StabilityLevel::Alpha,
                |r: &ReplicaSet| r.status.as_ref().map_or(0.0, |s| f64::from(s.replicas)),
            ),
            value_family(
                "kube_replicaset_status_fully_labeled_replicas",
                "The number of fully labeled replicas per ReplicaSet.",
                StabilityLevel::Alpha,
                |r: &ReplicaSet| {
                    f64::from(r.status.as_ref().and_then(|s| s.fully_labeled_replicas).unwrap_or(0))
                },
            ),
            value_family(
                "kube_replicaset_status_ready_replicas",
                "The number of ready replicas per ReplicaSet.",
                StabilityLevel::Alpha,
                |r: &ReplicaSet| {
                    f64::from(r.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0))
                },
            ),
            value_family(
                "kube_replicaset_status_observed_generation",
                "The generation observed by the ReplicaSet controller.",
                StabilityLevel::Alpha,
                |r: &ReplicaSet| {
                    r.status.as_ref().and_then(|s| s.observed_generation).unwrap_or(0) as f64
                },
            ),
            FamilyGenerator::new(
                "kube_replicaset_spec_replicas",
                "Number of desired pods for a ReplicaSet.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |r: &ReplicaSet| opt_value(r.spec.as_ref().and_then(|s| s.replicas)),
            ),
            value_family(
                "kube_replicaset_metadata_generation",
                "Sequence number representing a specific generation of the desired state.",
                StabilityLevel::Alpha,
                |r: &ReplicaSet| r.metadata.generation.unwrap_or(0) as f64,
            ),
            FamilyGenerator::new(
                "kube_replicaset_owner",
                "Information about the ReplicaSet's owner.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |r: &ReplicaSet| owner_metrics(r.metadata.owner_references.as_ref(), "<none>"),
            ),
            annotations_family(
                "replicaset",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "replicaset",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
        ],
        &["namespace", "replicaset"],
        namespace_name,
    )
}
