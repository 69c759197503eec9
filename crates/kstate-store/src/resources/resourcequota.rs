use k8s_openapi::api::core::v1::ResourceQuota;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
    quantity_metrics,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<ResourceQuota>> {
    with_identity(
        vec![
            created_family("resourcequota", StabilityLevel::Stable),
            FamilyGenerator::new(
                "kube_resourcequota",
                "Information about resource quota.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |rq: &ResourceQuota| {
                    let status = rq.status.as_ref();
                    let mut ms = quantity_metrics(status.and_then(|s| s.hard.as_ref()), &[("type", "hard")]);
                    ms.extend(quantity_metrics(status.and_then(|s| s.used.as_ref()), &[("type", "used")]));
                    ms
                },
            ),
            annotations_family(
                "resourcequota",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "resourcequota",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
        ],
        &["namespace", "resourcequota"],
        namespace_name,
    )
}
