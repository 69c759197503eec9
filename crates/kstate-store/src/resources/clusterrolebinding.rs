use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, name,
    resource_version_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<ClusterRoleBinding>> {
    with_identity(
        vec![
            annotations_family(
                "clusterrolebinding",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "clusterrolebinding",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            FamilyGenerator::new(
                "kube_clusterrolebinding_info",
                "Information about clusterrolebinding.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |crb: &ClusterRoleBinding| {
                    vec![Metric::with_labels(
                        [
                            ("roleref_kind", crb.role_ref.kind.clone()),
                            ("roleref_name", crb.role_ref.name.clone()),
                        ],
                        1.0,
                    )]
                },
            ),
            created_family("clusterrolebinding", StabilityLevel::Alpha),
            resource_version_family(
                "clusterrolebinding",
                "Resource version representing a specific version of the clusterrolebinding.",
                StabilityLevel::Alpha,
            ),
        ],
        &["clusterrolebinding"],
        name,
    )
}
