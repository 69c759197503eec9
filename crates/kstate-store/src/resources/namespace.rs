use k8s_openapi::api::core::v1::Namespace;
use kstate_core::{
    EmptyPolicy, FamilyGenerator,
    state::{enum_state_metrics, status_condition_metrics},
    with_identity,
};
use kstate_model::{MetricType, StabilityLevel};

use crate::common::{AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, name};

const PHASES: [&str; 2] = ["Active", "Terminating"];

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Namespace>> {
    with_identity(
        vec![
            created_family("namespace", StabilityLevel::Alpha),
            annotations_family(
                "namespace",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "namespace",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            FamilyGenerator::new(
                "kube_namespace_status_phase",
                "kubernetes namespace status phase.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |n: &Namespace| {
                    let phase = n
                        .status
                        .as_ref()
                        .and_then(|s| s.phase.as_deref())
                        .unwrap_or_default();
                    enum_state_metrics("phase", phase, &PHASES, EmptyPolicy::EmitZeros)
                },
            ),
            FamilyGenerator::new(
                "kube_namespace_status_condition",
                "The condition of a namespace.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |n: &Namespace| {
                    n.status
                        .as_ref()
                        .and_then(|s| s.conditions.as_ref())
                        .into_iter()
                        .flatten()
                        .flat_map(|c| status_condition_metrics(&c.type_, &c.status))
                        .collect()
                },
            ),
        ],
        &["namespace"],
        name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    #[test]
    fn phase_without_status_emits_zeros() {
        let ns: Namespace = fixture(json!({"metadata": {"name": "nsActiveTest"}}));
        assert_eq!(
            samples(&generators(&AllowedKeys::default()), &ns, "kube_namespace_status_phase"),
            vec![
                "kube_namespace_status_phase{namespace=\"nsActiveTest\",phase=\"Active\"} 0",
                "kube_namespace_status_phase{namespace=\"nsActiveTest\",phase=\"Terminating\"} 0",
            ]
        );
    }

    #[test]
    fn terminating_namespace_with_condition() {
        let ns: Namespace = fixture(json!({
            "metadata": {"name": "ns1", "labels": {"app": "example"}},
            "status": {
                "phase": "Terminating",
                "conditions": [{"type": "NamespaceDeletionDiscoveryFailure", "status": "True"}],
            },
        }));
        let gens = generators(&AllowedKeys::default());
        assert_eq!(
            samples(&gens, &ns, "kube_namespace_status_phase"),
            vec![
                "kube_namespace_status_phase{namespace=\"ns1\",phase=\"Active\"} 0",
                "kube_namespace_status_phase{namespace=\"ns1\",phase=\"Terminating\"} 1",
            ]
        );
        assert_eq!(
            samples(&gens, &ns, "kube_namespace_status_condition"),
            vec![
                "kube_namespace_status_condition{namespace=\"ns1\",condition=\"NamespaceDeletionDiscoveryFailure\",status=\"true\"} 1",
                "kube_namespace_status_condition{namespace=\"ns1\",condition=\"NamespaceDeletionDiscoveryFailure\",status=\"false\"} 0",
                "kube_namespace_status_condition{namespace=\"ns1\",condition=\"NamespaceDeletionDiscoveryFailure\",status=\"unknown\"} 0",
            ]
        );
        assert_eq!(
            samples(&gens, &ns, "kube_namespace_labels"),
            vec!["kube_namespace_labels{namespace=\"ns1\"} 1"]
        );
    }
}
