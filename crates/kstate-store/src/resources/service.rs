use k8s_openapi::api::core::v1::{Service, ServiceSpec};
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name};

fn spec_field(s: &Service, f: impl Fn(&ServiceSpec) -> Option<&String>) -> String {
    s.spec.as_ref().and_then(f).cloned().unwrap_or_default()
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Service>> {
    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_service_info",
                "Information about service.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |s: &Service| {
                    vec![Metric::with_labels(
                        [
                            ("cluster_ip", spec_field(s, |sp| sp.cluster_ip.as_ref())),
                            ("external_name", spec_field(s, |sp| sp.external_name.as_ref())),
                            ("load_balancer_ip", spec_field(s, |sp| sp.load_balancer_ip.as_ref())),
                        ],
                        1.0,
                    )]
                },
            ),
            created_family("service", StabilityLevel::Alpha),
            FamilyGenerator::new(
                "kube_service_spec_type",
                "Type about service.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |s: &Service| {
                    vec![Metric::with_labels(
                        [("type", spec_field(s, |sp| sp.type_.as_ref()))],
                        1.0,
                    )]
                },
            ),
            annotations_family(
                "service",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "service",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            FamilyGenerator::new(
                "kube_service_spec_external_ip",
                "Service external ips. One series for each ip",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |s: &Service| {
                    s.spec
                        .as_ref()
                        .and_then(|sp| sp.external_ips.as_ref())
                        .into_iter()
                        .flatten()
                        .map(|ip| Metric::with_labels([("external_ip", ip.as_str())], 1.0))
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_service_status_load_balancer_ingress",
                "Service load balancer ingress status",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |s: &Service| {
                    s.status
                        .as_ref()
                        .and_then(|st| st.load_balancer.as_ref())
                        .and_then(|lb| lb.ingress.as_ref())
                        .into_iter()
                        .flatten()
                        .map(|i| {
                            Metric::with_labels(
                                [
                                    ("ip", i.ip.clone().unwrap_or_default()),
                                    ("hostname", i.hostname.clone().unwrap_or_default()),
                                ],
                                1.0,
                            )
                        })
                        .collect()
                },
            ),
        ],
        &["namespace", "service"],
        namespace_name,
    )
}
