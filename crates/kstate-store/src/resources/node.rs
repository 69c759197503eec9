use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{Node, NodeStatus},
    apimachinery::pkg::api::resource::Quantity,
};
use kstate_core::{
    FamilyGenerator, QuantityExt, ResourceUnit,
    labels::sanitize_label_name,
    state::{bool_f64, status_condition_metrics},
    with_identity,
};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, deletion_family, labels_family,
    name,
};

const ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io/";

fn status(n: &Node) -> Option<&NodeStatus> {
    n.status.as_ref()
}

/// Allocatable and capacity samples. Every unit goes through the core
/// conversion so small byte quantities keep their fractional part.
fn node_resources(resources: Option<&BTreeMap<String, Quantity>>) -> Vec<Metric> {
    resources
        .into_iter()
        .flatten()
        .filter_map(|(resource, q)| {
            let unit = ResourceUnit::of(resource)?;
            let parsed = q.parsed().ok()?;
            Some(Metric::with_labels(
                [
                    ("resource", sanitize_label_name(resource)),
                    ("unit", unit.as_str().to_string()),
                ],
                parsed.as_cores(),
            ))
        })
        .collect()
}

fn info(n: &Node) -> Vec<Metric> {
    let node_info = status(n).and_then(|s| s.node_info.clone()).unwrap_or_default();
    let spec = n.spec.clone().unwrap_or_default();
    let internal_ip = status(n)
        .and_then(|s| s.addresses.as_ref())
        .into_iter()
        .flatten()
        .filter(|a| a.type_ == "InternalIP")
        .last()
        .map(|a| a.address.clone())
        .unwrap_or_default();
    vec![Metric::with_labels(
        [
            ("kernel_version", node_info.kernel_version),
            ("os_image", node_info.os_image),
            ("container_runtime_version", node_info.container_runtime_version),
            ("kubelet_version", node_info.kubelet_version),
            ("kubeproxy_version", "deprecated".to_string()),
            ("provider_id", spec.provider_id.unwrap_or_default()),
            ("pod_cidr", spec.pod_cidr.unwrap_or_default()),
            ("system_uuid", node_info.system_uuid),
            ("internal_ip", internal_ip),
        ],
        1.0,
    )]
}

/// Images list either `[digest, name]` or just `[name]`.
fn images(n: &Node) -> Vec<Metric> {
    status(n)
        .and_then(|s| s.images.as_ref())
        .into_iter()
        .flatten()
        .map(|image| {
            let names = image.names.as_deref().unwrap_or_default();
            let (digest, name) = match names {
                [digest, name] => (digest.clone(), name.clone()),
                [name] => (String::new(), name.clone()),
                _ => (String::new(), String::new()),
            };
            Metric::with_labels(
                [
                    ("image_digest", digest),
                    ("image_name", name),
                    ("image_size_bytes", image.size_bytes.unwrap_or(0).to_string()),
                ],
                1.0,
            )
        })
        .collect()
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Node>> {
    with_identity(
        vec![
            annotations_family(
                "node",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            created_family("node", StabilityLevel::Stable),
            deletion_family("kube_node_deletion_timestamp", StabilityLevel::Alpha),
            FamilyGenerator::new(
                "kube_node_info",
                "Information about a cluster node.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                info,
            ),
            labels_family("node", StabilityLevel::Stable, &allowed.labels, EmptyAllowList::Skip),
            FamilyGenerator::new(
                "kube_node_role",
                "The role of a cluster node.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |n: &Node| {
                    n.metadata
                        .labels
                        .iter()
                        .flatten()
                        .filter_map(|(k, _)| k.strip_prefix(ROLE_LABEL_PREFIX))
                        .map(|role| Metric::with_labels([("role", role)], 1.0))
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_node_spec_taint",
                "The taint of a cluster node.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |n: &Node| {
                    n.spec
                        .as_ref()
                        .and_then(|s| s.taints.as_ref())
                        .into_iter()
                        .flatten()
                        .map(|t| {
                            Metric::with_labels(
                                [
                                    ("key", t.key.clone()),
                                    ("value", t.value.clone().unwrap_or_default()),
                                    ("effect", t.effect.clone()),
                                ],
                                1.0,
                            )
                        })
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_node_spec_unschedulable",
                "Whether a node can schedule new pods.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |n: &Node| {
                    let unschedulable = n.spec.as_ref().and_then(|s| s.unschedulable).unwrap_or(false);
                    vec![Metric::value_only(bool_f64(unschedulable))]
                },
            ),
            FamilyGenerator::new(
                "kube_node_status_allocatable",
                "The allocatable for different resources of a node that are available for scheduling.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |n: &Node| node_resources(status(n).and_then(|s| s.allocatable.as_ref())),
            ),
            FamilyGenerator::new(
                "kube_node_status_capacity",
                "The capacity for different resources of a node.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |n: &Node| node_resources(status(n).and_then(|s| s.capacity.as_ref())),
            ),
            FamilyGenerator::new(
                "kube_node_status_condition",
                "The condition of a cluster node.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |n: &Node| {
                    status(n)
                        .and_then(|s| s.conditions.as_ref())
                        .into_iter()
                        .flatten()
                        .flat_map(|c| status_condition_metrics(&c.type_, &c.status))
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_node_status_addresses",
                "Node address information.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |n: &Node| {
                    status(n)
                        .and_then(|s| s.addresses.as_ref())
                        .into_iter()
                        .flatten()
                        .map(|a| {
                            Metric::with_labels(
                                [("type", a.type_.as_str()), ("address", a.address.as_str())],
                                1.0,
                            )
                        })
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_node_status_images",
                "Container Images on the Node",
                MetricType::Gauge,
                StabilityLevel::Stable,
                images,
            ),
        ],
        &["node"],
        name,
    )
}
