use k8s_openapi::api::storage::v1::StorageClass;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, name,
};

const DEFAULT_RECLAIM_POLICY: &str = "Delete";
const DEFAULT_VOLUME_BINDING_MODE: &str = "Immediate";

fn info(sc: &StorageClass) -> Vec<Metric> {
    vec![Metric::with_labels(
        [
            ("provisioner", sc.provisioner.as_str()),
            (
                "reclaim_policy",
                sc.reclaim_policy.as_deref().unwrap_or(DEFAULT_RECLAIM_POLICY),
            ),
            (
                "volume_binding_mode",
                sc.volume_binding_mode
                    .as_deref()
                    .unwrap_or(DEFAULT_VOLUME_BINDING_MODE),
            ),
        ],
        1.0,
    )]
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<StorageClass>> {
    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_storageclass_info",
                "Information about storageclass.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                info,
            ),
            created_family("storageclass", StabilityLevel::Stable),
            annotations_family(
                "storageclass",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "storageclass",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
        ],
        &["storageclass"],
        name,
    )
}
