use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family};

const RESOURCE: &str = "certificatesigningrequest";

fn condition_counts(csr: &CertificateSigningRequest) -> Vec<Metric> {
    let conditions = csr
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_deref())
        .unwrap_or_default();
    let count = |ty: &str| conditions.iter().filter(|c| c.type_ == ty).count() as f64;
    vec![
        Metric::with_labels([("condition", "approved")], count("Approved")),
        Metric::with_labels([("condition", "denied")], count("Denied")),
    ]
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<CertificateSigningRequest>> {
    with_identity(
        vec![
            annotations_family(
                RESOURCE,
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                RESOURCE,
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            created_family(RESOURCE, StabilityLevel::Alpha),
            FamilyGenerator::new(
                "kube_certificatesigningrequest_condition",
                "The number of each certificatesigningrequest condition",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                condition_counts,
            ),
            FamilyGenerator::new(
                "kube_certificatesigningrequest_cert_length",
                "Length of the issued cert",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |csr: &CertificateSigningRequest| {
                    let len = csr
                        .status
                        .as_ref()
                        .and_then(|s| s.certificate.as_ref())
                        .map_or(0, |c| c.0.len());
                    vec![Metric::value_only(len as f64)]
                },
            ),
        ],
        &["certificatesigningrequest", "signer_name"],
        |csr: &CertificateSigningRequest| {
            vec![
                csr.metadata.name.clone().unwrap_or_default(),
                csr.spec.signer_name.clone(),
            ]
        },
    )
}
