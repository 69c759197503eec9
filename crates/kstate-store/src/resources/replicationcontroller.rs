use k8s_openapi::api::core::v1::{ReplicationController, ReplicationControllerStatus};
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{MetricType, StabilityLevel};

use crate::common::{created_family, namespace_name, opt_value, owner_metrics, value_family};

fn status(rc: &ReplicationController) -> Option<&ReplicationControllerStatus> {
    rc.status.as_ref()
}

pub(crate) fn generators() -> Vec<FamilyGenerator<ReplicationController>> {
    use StabilityLevel::{Alpha, Stable};

    with_identity(
        vec![
            created_family("replicationcontroller", Stable),
            value_family(
                "kube_replicationcontroller_status_replicas",
                "The number of replicas per ReplicationController.",
                Stable,
                |rc: &ReplicationController| status(rc).map_or(0.0, |s| f64::from(s.replicas)),
            ),
            value_family(
                "kube_replicationcontroller_status_fully_labeled_replicas",
                "The number of fully labeled replicas per ReplicationController.",
                Stable,
                |rc: &ReplicationController| f64::from(status(rc).and_then(|s| s.fully_labeled_replicas).unwrap_or(0)),
            ),
            value_family(
                "kube_replicationcontroller_status_ready_replicas",
                "The number of ready replicas per ReplicationController.",
                Stable,
                |rc: &ReplicationController| f64::from(status(rc).and_then(|s| s.ready_replicas).unwrap_or(0)),
            ),
            value_family(
                "kube_replicationcontroller_status_available_replicas",
                "The number of available replicas per ReplicationController.",
                Stable,
                |rc: &ReplicationController| f64::from(status(rc).and_then(|s| s.available_replicas).unwrap_or(0)),
            ),
            value_family(
                "kube_replicationcontroller_status_observed_generation",
                "The generation observed by the ReplicationController controller.",
                Stable,
                |rc: &ReplicationController| status(rc).and_then(|s| s.observed_generation).unwrap_or(0) as f64,
            ),
            FamilyGenerator::new(
                "kube_replicationcontroller_spec_replicas",
                "Number of desired pods for a ReplicationController.",
                MetricType::Gauge,
                Stable,
                |rc: &ReplicationController| opt_value(rc.spec.as_ref().and_then(|s| s.replicas)),
            ),
            value_family(
                "kube_replicationcontroller_metadata_generation",
                "Sequence number representing a specific generation of the desired state.",
                Stable,
                |rc: &ReplicationController| rc.metadata.generation.unwrap_or(0) as f64,
            ),
            FamilyGenerator::new(
                "kube_replicationcontroller_owner",
                "Information about the ReplicationController's owner.",
                MetricType::Gauge,
                Alpha,
                |rc: &ReplicationController| owner_metrics(rc.metadata.owner_references.as_ref(), ""),
            ),
        ],
        &["namespace", "replicationcontroller"],
        namespace_name,
    )
}
