use k8s_openapi::api::core::v1::ServiceAccount;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, deletion_family, labels_family,
};

fn named<'a>(names: impl Iterator<Item = &'a str>) -> Vec<Metric> {
    names
        .map(|n| Metric::with_labels([("name", n)], 1.0))
        .collect()
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<ServiceAccount>> {
    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_serviceaccount_info",
                "Information about a service account",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |sa: &ServiceAccount| {
                    let automount = sa
                        .automount_service_account_token
                        .map(|b| b.to_string())
                        .unwrap_or_default();
                    vec![Metric::with_labels([("automount_token", automount)], 1.0)]
                },
            ),
            created_family("serviceaccount", StabilityLevel::Alpha),
            deletion_family("kube_serviceaccount_deleted", StabilityLevel::Alpha),
            FamilyGenerator::new(
                "kube_serviceaccount_secret",
                "Secret being referenced by a service account",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |sa: &ServiceAccount| {
                    named(
                        sa.secrets
                            .iter()
                            .flatten()
                            .map(|s| s.name.as_deref().unwrap_or_default()),
                    )
                },
            ),
            FamilyGenerator::new(
                "kube_serviceaccount_image_pull_secret",
                "Secret being referenced by a service account for the purpose of pulling images",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |sa: &ServiceAccount| {
                    named(
                        sa.image_pull_secrets
                            .iter()
                            .flatten()
                            .map(|s| s.name.as_str()),
                    )
                },
            ),
            annotations_family(
                "serviceaccount",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "serviceaccount",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
        ],
        &["namespace", "serviceaccount", "uid"],
        |sa: &ServiceAccount| {
            vec![
                sa.metadata.namespace.clone().unwrap_or_default(),
                sa.metadata.name.clone().unwrap_or_default(),
                sa.metadata.uid.clone().unwrap_or_default(),
            ]
        },
    )
}
