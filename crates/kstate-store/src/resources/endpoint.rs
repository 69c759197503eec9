use k8s_openapi::api::core::v1::{EndpointPort, Endpoints};
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, info_family, labels_family,
    namespace_name,
};

fn port_labels(port: &EndpointPort) -> [(&'static str, String); 3] {
    [
        ("port_protocol", port.protocol.clone().unwrap_or_default()),
        ("port_number", port.port.to_string()),
        ("port_name", port.name.clone().unwrap_or_default()),
    ]
}

/// One sample per (port, address) pair; not-ready addresses carry `ready="false"`.
fn addresses(e: &Endpoints) -> Vec<Metric> {
    let mut ms = Vec::new();
    for subset in e.subsets.iter().flatten() {
        for port in subset.ports.iter().flatten() {
            let ready = subset.addresses.iter().flatten().map(|a| (a, "true"));
            let not_ready = subset
                .not_ready_addresses
                .iter()
                .flatten()
                .map(|a| (a, "false"));
            for (address, is_ready) in ready.chain(not_ready) {
                let mut pairs = port_labels(port).to_vec();
                pairs.push(("ip", address.ip.clone()));
                pairs.push(("ready", is_ready.to_string()));
                ms.push(Metric::with_labels(pairs, 1.0));
            }
        }
    }
    ms
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Endpoints>> {
    with_identity(
        vec![
            info_family(
                "kube_endpoint_info",
                "Information about endpoint.",
                StabilityLevel::Stable,
            ),
            created_family("endpoint", StabilityLevel::Stable),
            annotations_family(
                "endpoint",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "endpoint",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            FamilyGenerator::new(
                "kube_endpoint_address",
                "Information about Endpoint available and non available addresses.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                addresses,
            ),
            FamilyGenerator::new(
                "kube_endpoint_ports",
                "Information about the Endpoint ports.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |e: &Endpoints| {
                    e.subsets
                        .iter()
                        .flatten()
                        .flat_map(|s| s.ports.iter().flatten())
                        .map(|p| {
                            Metric::with_labels(
                                [
                                    ("port_name", p.name.clone().unwrap_or_default()),
                                    ("port_protocol", p.protocol.clone().unwrap_or_default()),
                                    ("port_number", p.port.to_string()),
                                ],
                                1.0,
                            )
                        })
                        .collect()
                },
            )
            .deprecated("v2.14.0"),
        ],
        &["namespace", "endpoint"],
        namespace_name,
    )
}
