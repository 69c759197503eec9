use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress, IngressSpec};
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, info_family, labels_family,
    namespace_name, resource_version_family,
};

fn spec(i: &Ingress) -> Option<&IngressSpec> {
    i.spec.as_ref()
}

/// Backend service name and port; the port is its number, or its name when set by name.
fn backend_service(path: &HTTPIngressPath) -> Option<(String, String)> {
    let service = path.backend.service.as_ref()?;
    let port = service
        .port
        .as_ref()
        .and_then(|p| p.number.map(|n| n.to_string()).or_else(|| p.name.clone()))
        .unwrap_or_default();
    Some((service.name.clone(), port))
}

fn paths(i: &Ingress) -> Vec<Metric> {
    let rules = spec(i).and_then(|s| s.rules.as_deref()).unwrap_or_default();
    rules
        .iter()
        .filter_map(|rule| Some((rule.host.as_deref().unwrap_or_default(), rule.http.as_ref()?)))
        .flat_map(|(host, http)| {
            http.paths.iter().filter_map(move |path| {
                let (service, port) = backend_service(path)?;
                Some(Metric::with_labels(
                    [
                        ("host", host.to_string()),
                        ("path", path.path.clone().unwrap_or_default()),
                        ("service_name", service),
                        ("service_port", port),
                    ],
                    1.0,
                ))
            })
        })
        .collect()
}

fn tls(i: &Ingress) -> Vec<Metric> {
    let entries = spec(i).and_then(|s| s.tls.as_deref()).unwrap_or_default();
    entries
        .iter()
        .flat_map(|t| {
            let secret = t.secret_name.clone().unwrap_or_default();
            t.hosts
                .iter()
                .flatten()
                .map(move |host| Metric::with_labels([("tls_host", host.clone()), ("secret", secret.clone())], 1.0))
        })
        .collect()
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Ingress>> {
    with_identity(
        vec![
            info_family("kube_ingress_info", "Information about ingress.", StabilityLevel::Alpha),
            annotations_family(
                "ingress",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "ingress",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            created_family("ingress", StabilityLevel::Alpha),
            resource_version_family(
                "ingress",
                "Resource version representing a specific version of ingress.",
                StabilityLevel::Alpha,
            ),
            FamilyGenerator::new(
                "kube_ingress_path",
                "Ingress host, paths and backend service information.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                paths,
            ),
            FamilyGenerator::new(
                "kube_ingress_tls",
                "Ingress TLS host and secret information.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                tls,
            ),
        ],
        &["namespace", "ingress"],
        namespace_name,
    )
}
