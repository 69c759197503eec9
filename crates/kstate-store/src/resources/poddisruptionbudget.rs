use k8s_openapi::api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetStatus};
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::StabilityLevel;

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
    value_family,
};

fn status<F>(p: &PodDisruptionBudget, f: F) -> f64
where
    F: Fn(&PodDisruptionBudgetStatus) -> f64,
{
    p.status.as_ref().map_or(0.0, f)
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<PodDisruptionBudget>> {
    with_identity(
        vec![
            annotations_family(
                "poddisruptionbudget",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "poddisruptionbudget",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            created_family("poddisruptionbudget", StabilityLevel::Stable),
            value_family(
                "kube_poddisruptionbudget_status_current_healthy",
                "Current number of healthy pods",
                StabilityLevel::Stable,
                |p: &PodDisruptionBudget| status(p, |s| f64::from(s.current_healthy)),
            ),
            value_family(
                "kube_poddisruptionbudget_status_desired_healthy",
                "Minimum desired number of healthy pods",
                StabilityLevel::Stable,
                |p: &PodDisruptionBudget| status(p, |s| f64::from(s.desired_healthy)),
            ),
            value_family(
                "kube_poddisruptionbudget_status_pod_disruptions_allowed",
                "Number of pod disruptions that are currently allowed",
                StabilityLevel::Stable,
                |p: &PodDisruptionBudget| status(p, |s| f64::from(s.disruptions_allowed)),
            ),
            value_family(
                "kube_poddisruptionbudget_status_expected_pods",
                "Total number of pods counted by this disruption budget",
                StabilityLevel::Stable,
                |p: &PodDisruptionBudget| status(p, |s| f64::from(s.expected_pods)),
            ),
            value_family(
                "kube_poddisruptionbudget_status_observed_generation",
                "Most recent generation observed when updating this PDB status",
                StabilityLevel::Stable,
                |p: &PodDisruptionBudget| status(p, |s| s.observed_generation.unwrap_or(0) as f64),
            ),
        ],
        &["namespace", "poddisruptionbudget"],
        namespace_name,
    )
}
