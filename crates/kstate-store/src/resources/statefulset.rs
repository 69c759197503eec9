use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetStatus};
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, deletion_family,
    labels_family, namespace_name, opt_value, value_family,
};

fn status<F>(s: &StatefulSet, f: F) -> f64
where
    F: Fn(&StatefulSetStatus) -> Option<i32>,
{
    s.status.as_ref().and_then(f).map_or(0.0, f64::from)
}

fn revision<F>(s: &StatefulSet, f: F) -> Vec<Metric>
where
    F: Fn(&StatefulSetStatus) -> Option<&String>,
{
    let rev = s.status.as_ref().and_then(f).cloned().unwrap_or_default();
    vec![Metric::with_labels([("revision", rev)], 1.0)]
}

fn retention_policy(s: &StatefulSet) -> Vec<Metric> {
    let policy = s
        .spec
        .as_ref()
        .and_then(|sp| sp.persistent_volume_claim_retention_policy.as_ref());
    let when_deleted = policy.and_then(|p| p.when_deleted.clone()).unwrap_or_default();
    let when_scaled = policy.and_then(|p| p.when_scaled.clone()).unwrap_or_default();
    if when_deleted.is_empty() && when_scaled.is_empty() {
        return Vec::new();
    }
    vec![Metric::with_labels(
        [("when_deleted", when_deleted), ("when_scaled", when_scaled)],
        1.0,
    )]
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<StatefulSet>> {
    with_identity(
        vec![
            created_family("statefulset", StabilityLevel::Stable),
            value_family(
                "kube_statefulset_status_replicas",
                "The number of replicas per StatefulSet.",
                StabilityLevel::Stable,
                |s: &StatefulSet| status(s, |st| Some(st.replicas)),
            ),
            value_family(
                "kube_statefulset_status_replicas_available",
                "The number of available replicas per StatefulSet.",
                StabilityLevel::Stable,
                |s: &StatefulSet| status(s, |st| st.available_replicas),
            ),
            value_family(
                "kube_statefulset_status_replicas_current",
                "The number of current replicas per StatefulSet.",
                StabilityLevel::Stable,
                |s: &StatefulSet| status(s, |st| st.current_replicas),
            ),
            value_family(
                "kube_statefulset_status_replicas_ready",
                "The number of ready replicas per StatefulSet.",
                StabilityLevel::Stable,
                |s: &StatefulSet| status(s, |st| st.ready_replicas),
            ),
            value_family(
                "kube_statefulset_status_replicas_updated",
                "The number of updated replicas per StatefulSet.",
                StabilityLevel::Stable,
                |s: &StatefulSet| status(s, |st| st.updated_replicas),
            ),
            value_family(
                "kube_statefulset_status_observed_generation",
                "The generation observed by the StatefulSet controller.",
                StabilityLevel::Stable,
                |s: &StatefulSet| {
                    s.status.as_ref().and_then(|st| st.observed_generation).unwrap_or(0) as f64
                },
            ),
            FamilyGenerator::new(
                "kube_statefulset_replicas",
                "Number of desired pods for a StatefulSet.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |s: &StatefulSet| opt_value(s.spec.as_ref().and_then(|sp| sp.replicas)),
            ),
            FamilyGenerator::new(
                "kube_statefulset_ordinals_start",
                "Start ordinal of the StatefulSet.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |s: &StatefulSet| {
                    let ordinals = s.spec.as_ref().and_then(|sp| sp.ordinals.as_ref());
                    opt_value(ordinals.map(|o| o.start.unwrap_or(0)))
                },
            ),
            value_family(
                "kube_statefulset_metadata_generation",
                "Sequence number representing a specific generation of the desired state for the StatefulSet.",
                StabilityLevel::Stable,
                |s: &StatefulSet| s.metadata.generation.unwrap_or(0) as f64,
            ),
            FamilyGenerator::new(
                "kube_statefulset_persistentvolumeclaim_retention_policy",
                "Count of retention policy for StatefulSet template PVCs",
                MetricType::Gauge,
                StabilityLevel::Stable,
                retention_policy,
            ),
            annotations_family(
                "statefulset",
                StabilityLevel::Stable,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "statefulset",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            FamilyGenerator::new(
                "kube_statefulset_status_current_revision",
                "Indicates the version of the StatefulSet used to generate Pods in the sequence [0,currentReplicas).",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |s: &StatefulSet| revision(s, |st| st.current_revision.as_ref()),
            ),
            FamilyGenerator::new(
                "kube_statefulset_status_update_revision",
                "Indicates the version of the StatefulSet used to generate Pods in the sequence [replicas-updatedReplicas,replicas)",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |s: &StatefulSet| revision(s, |st| st.update_revision.as_ref()),
            ),
            deletion_family("kube_statefulset_deletion_timestamp", StabilityLevel::Stable),
        ],
        &["namespace", "statefulset"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    fn statefulset(spec_extra: serde_json::Value) -> StatefulSet {
        let mut spec = json!({"selector": {}, "template": {}, "serviceName": "svc", "replicas": 3});
        if let (Some(spec), Some(extra)) = (spec.as_object_mut(), spec_extra.as_object()) {
            spec.extend(extra.clone());
        }
        fixture(json!({
            "metadata": {"name": "statefulset1", "namespace": "ns1", "generation": 3},
            "spec": spec,
            "status": {"replicas": 2, "observedGeneration": 1, "currentRevision": "cr1", "updateRevision": "ur1"},
        }))
    }

    #[test]
    fn revisions_and_replicas() {
        let s = statefulset(json!({}));
        let gens = generators(&AllowedKeys::default());
        assert_eq!(
            samples(&gens, &s, "kube_statefulset_status_current_revision"),
            vec!["kube_statefulset_status_current_revision{namespace=\"ns1\",statefulset=\"statefulset1\",revision=\"cr1\"} 1"]
        );
        assert_eq!(
            samples(&gens, &s, "kube_statefulset_replicas"),
            vec!["kube_statefulset_replicas{namespace=\"ns1\",statefulset=\"statefulset1\"} 3"]
        );
        assert_eq!(
            samples(&gens, &s, "kube_statefulset_status_replicas_ready"),
            vec!["kube_statefulset_status_replicas_ready{namespace=\"ns1\",statefulset=\"statefulset1\"} 0"]
        );
        assert!(samples(&gens, &s, "kube_statefulset_ordinals_start").is_empty());
        assert!(samples(&gens, &s, "kube_statefulset_persistentvolumeclaim_retention_policy").is_empty());
    }

    #[test]
    fn ordinals_and_retention_policy() {
        let s = statefulset(json!({
            "ordinals": {"start": 2},
            "persistentVolumeClaimRetentionPolicy": {"whenDeleted": "Retain", "whenScaled": "Delete"},
        }));
        let gens = generators(&AllowedKeys::default());
        assert_eq!(
            samples(&gens, &s, "kube_statefulset_ordinals_start"),
            vec!["kube_statefulset_ordinals_start{namespace=\"ns1\",statefulset=\"statefulset1\"} 2"]
        );
        assert_eq!(
            samples(&gens, &s, "kube_statefulset_persistentvolumeclaim_retention_policy"),
            vec!["kube_statefulset_persistentvolumeclaim_retention_policy{namespace=\"ns1\",statefulset=\"statefulset1\",when_deleted=\"Retain\",when_scaled=\"Delete\"} 1"]
        );
    }
}
