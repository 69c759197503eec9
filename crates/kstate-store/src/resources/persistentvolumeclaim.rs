use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kstate_core::{
    EmptyPolicy, FamilyGenerator, QuantityExt,
    state::{enum_state_metrics, status_condition_metrics},
    with_identity,
};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
};

const PHASES: [&str; 3] = ["Lost", "Bound", "Pending"];

const BETA_STORAGE_CLASS_ANNOTATION: &str = "volume.beta.kubernetes.io/storage-class";

/// The beta annotation wins over the spec field; `<none>` when neither is set.
fn storage_class(p: &PersistentVolumeClaim) -> String {
    if let Some(class) = p
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(BETA_STORAGE_CLASS_ANNOTATION))
    {
        return class.clone();
    }
    p.spec
        .as_ref()
        .and_then(|s| s.storage_class_name.clone())
        .unwrap_or_else(|| "<none>".to_string())
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<PersistentVolumeClaim>> {
    with_identity(
        vec![
            labels_family(
                "persistentvolumeclaim",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            annotations_family(
                "persistentvolumeclaim",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            FamilyGenerator::new(
                "kube_persistentvolumeclaim_info",
                "Information about persistent volume claim.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |p: &PersistentVolumeClaim| {
                    let volume = p
                        .spec
                        .as_ref()
                        .and_then(|s| s.volume_name.clone())
                        .unwrap_or_default();
                    vec![Metric::with_labels(
                        [("storageclass", storage_class(p)), ("volumename", volume)],
                        1.0,
                    )]
                },
            ),
            FamilyGenerator::new(
                "kube_persistentvolumeclaim_status_phase",
                "The phase the persistent volume claim is currently in.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |p: &PersistentVolumeClaim| {
                    let phase = p
                        .status
                        .as_ref()
                        .and_then(|s| s.phase.as_deref())
                        .unwrap_or_default();
                    enum_state_metrics("phase", phase, &PHASES, EmptyPolicy::Skip)
                },
            ),
            FamilyGenerator::new(
                "kube_persistentvolumeclaim_resource_requests_storage_bytes",
                "The capacity of storage requested by the persistent volume claim.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |p: &PersistentVolumeClaim| {
                    p.spec
                        .as_ref()
                        .and_then(|s| s.resources.as_ref())
                        .and_then(|r| r.requests.as_ref())
                        .and_then(|r| r.get("storage"))
                        .and_then(|q| q.parsed().ok())
                        .map(|q| vec![Metric::value_only(q.value() as f64)])
                        .unwrap_or_default()
                },
            ),
            FamilyGenerator::new(
                "kube_persistentvolumeclaim_access_mode",
                "The access mode(s) specified by the persistent volume claim.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |p: &PersistentVolumeClaim| {
                    p.spec
                        .as_ref()
                        .and_then(|s| s.access_modes.as_ref())
                        .into_iter()
                        .flatten()
                        .map(|mode| Metric::with_labels([("access_mode", mode.as_str())], 1.0))
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_persistentvolumeclaim_status_condition",
                "Information about status of different conditions of persistent volume claim.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |p: &PersistentVolumeClaim| {
                    p.status
                        .as_ref()
                        .and_then(|s| s.conditions.as_ref())
                        .into_iter()
                        .flatten()
                        .flat_map(|c| status_condition_metrics(&c.type_, &c.status))
                        .collect()
                },
            ),
            created_family("persistentvolumeclaim", StabilityLevel::Alpha),
        ],
        &["namespace", "persistentvolumeclaim"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    const ID: &str = "namespace=\"default\",persistentvolumeclaim=\"mysql-data\"";

    fn claim() -> PersistentVolumeClaim {
        fixture(json!({
            "metadata": {
                "name": "mysql-data",
                "namespace": "default",
                "labels": {"app": "mysql-server"},
            },
            "spec": {
                "storageClassName": "rbd",
                "volumeName": "pvc-mysql-data",
                "accessModes": ["ReadWriteOnce"],
                "resources": {"requests": {"storage": "1Gi"}},
            },
            "status": {
                "phase": "Bound",
                "conditions": [{"type": "Resizing", "status": "True"}],
            },
        }))
    }

    #[test]
    fn bound_claim_families() {
        let gens = generators(&AllowedKeys::default());
        let pvc = claim();

        assert_eq!(
            samples(&gens, &pvc, "kube_persistentvolumeclaim_info"),
            vec![format!("kube_persistentvolumeclaim_info{{{ID},storageclass=\"rbd\",volumename=\"pvc-mysql-data\"}} 1")]
        );
        assert_eq!(
            samples(&gens, &pvc, "kube_persistentvolumeclaim_status_phase"),
            vec![
                format!("kube_persistentvolumeclaim_status_phase{{{ID},phase=\"Lost\"}} 0"),
                format!("kube_persistentvolumeclaim_status_phase{{{ID},phase=\"Bound\"}} 1"),
                format!("kube_persistentvolumeclaim_status_phase{{{ID},phase=\"Pending\"}} 0"),
            ]
        );
        assert_eq!(
            samples(&gens, &pvc, "kube_persistentvolumeclaim_resource_requests_storage_bytes"),
            vec![format!("kube_persistentvolumeclaim_resource_requests_storage_bytes{{{ID}}} 1.073741824e+09")]
        );
        assert_eq!(
            samples(&gens, &pvc, "kube_persistentvolumeclaim_access_mode"),
            vec![format!("kube_persistentvolumeclaim_access_mode{{{ID},access_mode=\"ReadWriteOnce\"}} 1")]
        );
        assert_eq!(samples(&gens, &pvc, "kube_persistentvolumeclaim_status_condition").len(), 3);
        assert_eq!(
            samples(&gens, &pvc, "kube_persistentvolumeclaim_labels"),
            vec![format!("kube_persistentvolumeclaim_labels{{{ID}}} 1")]
        );
    }

    #[test]
    fn storage_class_prefers_beta_annotation() {
        let mut pvc = claim();
        pvc.metadata.annotations = Some(
            [(BETA_STORAGE_CLASS_ANNOTATION.to_string(), "legacy".to_string())].into(),
        );
        assert_eq!(storage_class(&pvc), "legacy");

        let bare: PersistentVolumeClaim = fixture(json!({"metadata": {"name": "x"}}));
        assert_eq!(storage_class(&bare), "<none>");
    }

    #[test]
    fn phase_is_skipped_when_unset() {
        let pvc: PersistentVolumeClaim = fixture(json!({
            "metadata": {"name": "x", "namespace": "default"},
        }));
        let gens = generators(&AllowedKeys::default());
        assert!(samples(&gens, &pvc, "kube_persistentvolumeclaim_status_phase").is_empty());
        assert!(samples(&gens, &pvc, "kube_persistentvolumeclaim_resource_requests_storage_bytes").is_empty());
    }
}
