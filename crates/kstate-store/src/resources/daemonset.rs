use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetStatus};
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::StabilityLevel;

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
    value_family,
};

fn status<F>(d: &DaemonSet, f: F) -> f64
where
    F: Fn(&DaemonSetStatus) -> f64,
{
    d.status.as_ref().map_or(0.0, f)
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<DaemonSet>> {
    with_identity(
        vec![
            created_family("daemonset", StabilityLevel::Stable),
            value_family(
                "kube_daemonset_status_current_number_scheduled",
                "The number of nodes running at least one daemon pod and are supposed to.",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| f64::from(s.current_number_scheduled)),
            ),
            value_family(
                "kube_daemonset_status_desired_number_scheduled",
                "The number of nodes that should be running the daemon pod.",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| f64::from(s.desired_number_scheduled)),
            ),
            value_family(
                "kube_daemonset_status_number_available",
                "The number of nodes that should be running the daemon pod and have one or more of the daemon pod running and available",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| f64::from(s.number_available.unwrap_or(0))),
            ),
            value_family(
                "kube_daemonset_status_number_misscheduled",
                "The number of nodes running a daemon pod but are not supposed to.",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| f64::from(s.number_misscheduled)),
            ),
            value_family(
                "kube_daemonset_status_number_ready",
                "The number of nodes that should be running the daemon pod and have one or more of the daemon pod running and ready.",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| f64::from(s.number_ready)),
            ),
            value_family(
                "kube_daemonset_status_number_unavailable",
                "The number of nodes that should be running the daemon pod and have none of the daemon pod running and available",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| f64::from(s.number_unavailable.unwrap_or(0))),
            ),
            value_family(
                "kube_daemonset_status_observed_generation",
                "The most recent generation observed by the daemon set controller.",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| s.observed_generation.unwrap_or(0) as f64),
            ),
            value_family(
                "kube_daemonset_status_updated_number_scheduled",
                "The total number of nodes that are running updated daemon pod",
                StabilityLevel::Stable,
                |d: &DaemonSet| status(d, |s| f64::from(s.updated_number_scheduled.unwrap_or(0))),
            ),
            value_family(
                "kube_daemonset_metadata_generation",
                "Sequence number representing a specific generation of the desired state.",
                StabilityLevel::Stable,
                |d: &DaemonSet| d.metadata.generation.unwrap_or(0) as f64,
            ),
            annotations_family(
                "daemonset",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "daemonset",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
        ],
        &["namespace", "daemonset"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    #[test]
    fn status_counts() {
        let ds: DaemonSet = fixture(json!({
            "metadata": {"name": "ds1", "namespace": "ns1", "generation": 21},
            "status": {
                "currentNumberScheduled": 15,
                "desiredNumberScheduled": 5,
                "numberMisscheduled": 10,
                "numberReady": 5,
                "numberAvailable": 3,
                "observedGeneration": 2,
            },
        }));
        let gens = generators(&AllowedKeys::default());
        assert_eq!(
            samples(&gens, &ds, "kube_daemonset_status_number_available"),
            vec!["kube_daemonset_status_number_available{namespace=\"ns1\",daemonset=\"ds1\"} 3"]
        );
        assert_eq!(
            samples(&gens, &ds, "kube_daemonset_status_number_unavailable"),
            vec!["kube_daemonset_status_number_unavailable{namespace=\"ns1\",daemonset=\"ds1\"} 0"]
        );
        assert_eq!(
            samples(&gens, &ds, "kube_daemonset_metadata_generation"),
            vec!["kube_daemonset_metadata_generation{namespace=\"ns1\",daemonset=\"ds1\"} 21"]
        );
        assert!(samples(&gens, &ds, "kube_daemonset_labels").is_empty());
    }
}
