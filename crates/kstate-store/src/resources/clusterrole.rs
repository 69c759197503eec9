use k8s_openapi::api::rbac::v1::ClusterRole;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::StabilityLevel;

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, info_family, labels_family,
    name, resource_version_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<ClusterRole>> {
    with_identity(
        vec![
            annotations_family(
                "clusterrole",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "clusterrole",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            info_family(
                "kube_clusterrole_info",
                "Information about cluster role.",
                StabilityLevel::Alpha,
            ),
            created_family("clusterrole", StabilityLevel::Alpha),
            resource_version_family(
                "clusterrole",
                "Resource version representing a specific version of the cluster role.",
                StabilityLevel::Alpha,
            ),
        ],
        &["clusterrole"],
        name,
    )
}
