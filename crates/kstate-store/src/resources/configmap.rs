use k8s_openapi::api::core::v1::ConfigMap;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::StabilityLevel;

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, info_family, labels_family,
    namespace_name, resource_version_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<ConfigMap>> {
    with_identity(
        vec![
            annotations_family(
                "configmap",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "configmap",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            info_family(
                "kube_configmap_info",
                "Information about configmap.",
                StabilityLevel::Stable,
            ),
            created_family("configmap", StabilityLevel::Stable),
            resource_version_family(
                "configmap",
                "Resource version representing a specific version of the configmap.",
                StabilityLevel::Alpha,
            ),
        ],
        &["namespace", "configmap"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, render};

    #[test]
    fn configmap_families() {
        let cm: ConfigMap = fixture(json!({
            "metadata": {
                "name": "configmap1",
                "namespace": "ns1",
                "uid": "u1",
                "resourceVersion": "123456",
                "creationTimestamp": "2017-09-20T10:06:40Z",
                "labels": {"app": "example"},
            }
        }));
        let allowed = AllowedKeys {
            labels: vec!["app".to_string()],
            annotations: vec![],
        };
        let out = render(&generators(&allowed), &cm);
        assert_eq!(
            out,
            "# HELP kube_configmap_annotations Kubernetes annotations converted to Prometheus labels.\n\
             # TYPE kube_configmap_annotations gauge\n\
             # HELP kube_configmap_labels [STABLE] Kubernetes labels converted to Prometheus labels.\n\
             # TYPE kube_configmap_labels gauge\n\
             kube_configmap_labels{namespace=\"ns1\",configmap=\"configmap1\",label_app=\"example\"} 1\n\
             # HELP kube_configmap_info [STABLE] Information about configmap.\n\
             # TYPE kube_configmap_info gauge\n\
             kube_configmap_info{namespace=\"ns1\",configmap=\"configmap1\"} 1\n\
             # HELP kube_configmap_created [STABLE] Unix creation timestamp\n\
             # TYPE kube_configmap_created gauge\n\
             kube_configmap_created{namespace=\"ns1\",configmap=\"configmap1\"} 1.505902e+09\n\
             # HELP kube_configmap_metadata_resource_version Resource version representing a specific version of the configmap.\n\
             # TYPE kube_configmap_metadata_resource_version gauge\n\
             kube_configmap_metadata_resource_version{namespace=\"ns1\",configmap=\"configmap1\"} 123456\n"
        );
    }
}
