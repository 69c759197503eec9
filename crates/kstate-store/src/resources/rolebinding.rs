use k8s_openapi::api::rbac::v1::RoleBinding;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
    resource_version_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<RoleBinding>> {
    with_identity(
        vec![
            annotations_family(
                "rolebinding",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "rolebinding",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            FamilyGenerator::new(
                "kube_rolebinding_info",
                "Information about rolebinding.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |rb: &RoleBinding| {
                    vec![Metric::with_labels(
                        [
                            ("roleref_kind", rb.role_ref.kind.clone()),
                            ("roleref_name", rb.role_ref.name.clone()),
                        ],
                        1.0,
                    )]
                },
            ),
            created_family("rolebinding", StabilityLevel::Alpha),
            resource_version_family(
                "rolebinding",
                "Resource version representing a specific version of the rolebinding.",
                StabilityLevel::Alpha,
            ),
        ],
        &["namespace", "rolebinding"],
        namespace_name,
    )
}
