use k8s_openapi::api::core::v1::Secret;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, info_family, labels_family,
    namespace_name, owner_metrics, resource_version_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Secret>> {
    with_identity(
        vec![
            info_family(
                "kube_secret_info",
                "Information about secret.",
                StabilityLevel::Stable,
            ),
            FamilyGenerator::new(
                "kube_secret_type",
                "Type about secret.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |s: &Secret| {
                    vec![Metric::with_labels(
                        [("type", s.type_.clone().unwrap_or_default())],
                        1.0,
                    )]
                },
            ),
            annotations_family(
                "secret",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "secret",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            created_family("secret", StabilityLevel::Stable),
            resource_version_family(
                "secret",
                "Resource version representing a specific version of secret.",
                StabilityLevel::Alpha,
            ),
            FamilyGenerator::new(
                "kube_secret_owner",
                "Information about the Secret's owner.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |s: &Secret| owner_metrics(s.metadata.owner_references.as_ref(), ""),
            ),
        ],
        &["namespace", "secret"],
        namespace_name,
    )
}
