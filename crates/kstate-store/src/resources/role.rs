use k8s_openapi::api::rbac::v1::Role;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::StabilityLevel;

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, info_family, labels_family,
    namespace_name, resource_version_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Role>> {
    with_identity(
        vec![
            annotations_family("role", StabilityLevel::Alpha, &allowed.annotations, EmptyAllowList::Skip),
            labels_family("role", StabilityLevel::Alpha, &allowed.labels, EmptyAllowList::Skip),
            info_family("kube_role_info", "Information about role.", StabilityLevel::Alpha),
            created_family("role", StabilityLevel::Alpha),
            resource_version_family(
                "role",
                "Resource version representing a specific version of the role.",
                StabilityLevel::Alpha,
            ),
        ],
        &["namespace", "role"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, render};

    #[test]
    fn role_families() {
        let role: Role = fixture(json!({
            "metadata": {
                "name": "role1",
                "namespace": "ns1",
                "resourceVersion": "123",
                "creationTimestamp": "2017-09-20T10:06:40Z",
                "labels": {"app": "mysql-server"},
            }
        }));
        let allowed = AllowedKeys {
            labels: vec!["app".to_string()],
            annotations: vec![],
        };
        let out = render(&generators(&allowed), &role);
        assert!(out.contains("kube_role_info{namespace=\"ns1\",role=\"role1\"} 1\n"));
        assert!(out.contains("kube_role_labels{namespace=\"ns1\",role=\"role1\",label_app=\"mysql-server\"} 1\n"));
        assert!(out.contains("kube_role_created{namespace=\"ns1\",role=\"role1\"} 1.505902e+09\n"));
        assert!(out.contains("kube_role_metadata_resource_version{namespace=\"ns1\",role=\"role1\"} 123\n"));
        assert!(!out.contains("kube_role_annotations{"));
    }
}
