use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeSpec};
use kstate_core::{
    EmptyPolicy, FamilyGenerator, QuantityExt,
    state::enum_state_metrics,
    with_identity,
};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{AllowedKeys, EmptyAllowList, annotations_family, labels_family, name};

const PHASES: [&str; 5] = ["Pending", "Available", "Bound", "Released", "Failed"];

const INFO_KEYS: [&str; 13] = [
    "storageclass",
    "gce_persistent_disk_name",
    "ebs_volume_id",
    "azure_disk_name",
    "fc_wwids",
    "fc_lun",
    "fc_target_wwns",
    "iscsi_target_portal",
    "iscsi_iqn",
    "iscsi_lun",
    "iscsi_initiator_name",
    "nfs_server",
    "nfs_path",
];

/// Backing volume details; only the first populated source is reported.
#[derive(Default)]
struct VolumeSource {
    gce_pd_name: String,
    ebs_volume_id: String,
    azure_disk_name: String,
    fc_wwids: String,
    fc_lun: String,
    fc_target_wwns: String,
    iscsi_target_portal: String,
    iscsi_iqn: String,
    iscsi_lun: String,
    iscsi_initiator_name: String,
    nfs_server: String,
    nfs_path: String,
}

impl VolumeSource {
    fn of(spec: &PersistentVolumeSpec) -> Self {
        let mut src = Self::default();
        if let Some(gce) = &spec.gce_persistent_disk {
            src.gce_pd_name = gce.pd_name.clone();
        } else if let Some(ebs) = &spec.aws_elastic_block_store {
            src.ebs_volume_id = ebs.volume_id.clone();
        } else if let Some(azure) = &spec.azure_disk {
            src.azure_disk_name = azure.disk_name.clone();
        } else if let Some(fc) = &spec.fc {
            src.fc_lun = fc.lun.map(|l| l.to_string()).unwrap_or_default();
            src.fc_target_wwns = fc.target_wwns.as_deref().unwrap_or_default().join(",");
            src.fc_wwids = fc.wwids.as_deref().unwrap_or_default().join(",");
        } else if let Some(iscsi) = &spec.iscsi {
            src.iscsi_target_portal = iscsi.target_portal.clone();
            src.iscsi_iqn = iscsi.iqn.clone();
            src.iscsi_lun = iscsi.lun.to_string();
            src.iscsi_initiator_name = iscsi.initiator_name.clone().unwrap_or_default();
        } else if let Some(nfs) = &spec.nfs {
            src.nfs_server = nfs.server.clone();
            src.nfs_path = nfs.path.clone();
        }
        src
    }
}

fn info(pv: &PersistentVolume) -> Vec<Metric> {
    let spec = pv.spec.clone().unwrap_or_default();
    let src = VolumeSource::of(&spec);
    let values = [
        spec.storage_class_name.unwrap_or_default(),
        src.gce_pd_name,
        src.ebs_volume_id,
        src.azure_disk_name,
        src.fc_wwids,
        src.fc_lun,
        src.fc_target_wwns,
        src.iscsi_target_portal,
        src.iscsi_iqn,
        src.iscsi_lun,
        src.iscsi_initiator_name,
        src.nfs_server,
        src.nfs_path,
    ];
    vec![Metric::with_labels(INFO_KEYS.into_iter().zip(values), 1.0)]
}

fn capacity_bytes(pv: &PersistentVolume) -> f64 {
    pv.spec
        .as_ref()
        .and_then(|s| s.capacity.as_ref())
        .and_then(|c| c.get("storage"))
        .and_then(|q| q.parsed().ok())
        .map_or(0.0, |q| q.value() as f64)
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<PersistentVolume>> {
    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_persistentvolume_claim_ref",
                "Information about the Persitant Volume Claim Reference.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |pv: &PersistentVolume| {
                    pv.spec
                        .as_ref()
                        .and_then(|s| s.claim_ref.as_ref())
                        .map(|c| {
                            vec![Metric::with_labels(
                                [
                                    ("name", c.name.clone().unwrap_or_default()),
                                    ("claim_namespace", c.namespace.clone().unwrap_or_default()),
                                ],
                                1.0,
                            )]
                        })
                        .unwrap_or_default()
                },
            ),
            annotations_family(
                "persistentvolume",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "persistentvolume",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            FamilyGenerator::new(
                "kube_persistentvolume_status_phase",
                "The phase indicates if a volume is available, bound to a claim, or released by a claim.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |pv: &PersistentVolume| {
                    let phase = pv
                        .status
                        .as_ref()
                        .and_then(|s| s.phase.as_deref())
                        .unwrap_or_default();
                    enum_state_metrics("phase", phase, &PHASES, EmptyPolicy::Skip)
                },
            ),
            FamilyGenerator::new(
                "kube_persistentvolume_info",
                "Information about persistentvolume.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                info,
            ),
            FamilyGenerator::new(
                "kube_persistentvolume_capacity_bytes",
                "Persistentvolume capacity in bytes.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |pv: &PersistentVolume| vec![Metric::value_only(capacity_bytes(pv))],
            ),
        ],
        &["persistentvolume"],
        name,
    )
}
