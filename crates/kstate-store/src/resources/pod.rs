use std::{collections::BTreeMap, net::IpAddr};

use k8s_openapi::api::core::v1::{
    Container, ContainerState, ContainerStateTerminated, ContainerStatus, Pod, PodCondition, PodSpec,
    PodStatus, Toleration,
};
use kstate_core::{
    EmptyPolicy, FamilyGenerator, QuantityExt,
    labels::map_to_prometheus_labels,
    state::{bool_f64, condition_metrics, enum_state_metrics, unix_seconds},
    with_identity,
};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, controller_ref, created_family,
    deletion_family, labels_family, limits, owner_metrics, requests, resource_metrics,
};

const PHASES: [&str; 5] = ["Pending", "Succeeded", "Failed", "Unknown", "Running"];
const QOS_CLASSES: [&str; 3] = ["BestEffort", "Burstable", "Guaranteed"];
const STATUS_REASONS: [&str; 5] = [
    "Evicted",
    "NodeAffinity",
    "NodeLost",
    "Shutdown",
    "UnexpectedAdmissionError",
];

/// Which container list of the pod a family reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containers {
    Regular,
    Init,
}

impl Containers {
    fn specs(self, p: &Pod) -> &[Container] {
        let Some(spec) = p.spec.as_ref() else {
            return &[];
        };
        match self {
            Containers::Regular => &spec.containers,
            Containers::Init => spec.init_containers.as_deref().unwrap_or_default(),
        }
    }

    fn statuses(self, p: &Pod) -> &[ContainerStatus] {
        let Some(status) = p.status.as_ref() else {
            return &[];
        };
        match self {
            Containers::Regular => status.container_statuses.as_deref(),
            Containers::Init => status.init_container_statuses.as_deref(),
        }
        .unwrap_or_default()
    }
}

fn spec(p: &Pod) -> Option<&PodSpec> {
    p.spec.as_ref()
}

fn status(p: &Pod) -> Option<&PodStatus> {
    p.status.as_ref()
}

fn conditions(p: &Pod) -> &[PodCondition] {
    status(p)
        .and_then(|s| s.conditions.as_deref())
        .unwrap_or_default()
}

fn node_name(p: &Pod) -> String {
    spec(p).and_then(|s| s.node_name.clone()).unwrap_or_default()
}

fn container_sample(cs: &ContainerStatus, value: f64) -> Metric {
    Metric::with_labels([("container", cs.name.as_str())], value)
}

/// One sample per container status, labeled by container name.
fn per_container<F>(p: &Pod, which: Containers, value: F) -> Vec<Metric>
where
    F: Fn(&ContainerStatus) -> f64,
{
    which
        .statuses(p)
        .iter()
        .map(|cs| container_sample(cs, value(cs)))
        .collect()
}

/// `{container, reason}` samples for statuses where `reason` yields something.
fn container_reasons<F>(p: &Pod, which: Containers, reason: F) -> Vec<Metric>
where
    F: Fn(&ContainerStatus) -> Option<String>,
{
    which
        .statuses(p)
        .iter()
        .filter_map(|cs| {
            let reason = reason(cs)?;
            Some(Metric::with_labels(
                [("container", cs.name.clone()), ("reason", reason)],
                1.0,
            ))
        })
        .collect()
}

fn current(cs: &ContainerStatus) -> Option<&ContainerState> {
    cs.state.as_ref()
}

fn last(cs: &ContainerStatus) -> Option<&ContainerState> {
    cs.last_state.as_ref()
}

fn container_info(p: &Pod, which: Containers) -> Vec<Metric> {
    let statuses = which.statuses(p);
    which
        .specs(p)
        .iter()
        .flat_map(|c| {
            statuses.iter().filter(move |cs| cs.name == c.name).map(move |cs| {
                let mut pairs = vec![
                    ("container", cs.name.clone()),
                    ("image_spec", c.image.clone().unwrap_or_default()),
                    ("image", cs.image.clone()),
                    ("image_id", cs.image_id.clone()),
                    ("container_id", cs.container_id.clone().unwrap_or_default()),
                ];
                if which == Containers::Init {
                    pairs.push(("restart_policy", c.restart_policy.clone().unwrap_or_default()));
                }
                Metric::with_labels(pairs, 1.0)
            })
        })
        .collect()
}

fn container_resources(p: &Pod, which: Containers, limit: bool) -> Vec<Metric> {
    let node = node_name(p);
    which
        .specs(p)
        .iter()
        .flat_map(|c| {
            let resources = if limit {
                limits(c.resources.as_ref())
            } else {
                requests(c.resources.as_ref())
            };
            resource_metrics(&[("container", c.name.as_str()), ("node", node.as_str())], resources)
        })
        .collect()
}

fn completion_time(p: &Pod) -> Vec<Metric> {
    let last_finish = Containers::Regular
        .statuses(p)
        .iter()
        .filter_map(|cs| current(cs)?.terminated.as_ref()?.finished_at.as_ref())
        .map(unix_seconds)
        .fold(0.0_f64, f64::max);
    if last_finish > 0.0 {
        vec![Metric::value_only(last_finish)]
    } else {
        Vec::new()
    }
}

fn state_started(p: &Pod) -> Vec<Metric> {
    Containers::Regular
        .statuses(p)
        .iter()
        .filter_map(|cs| {
            let state = current(cs)?;
            let started = match (&state.running, &state.terminated) {
                (Some(running), _) => running.started_at.as_ref(),
                (None, Some(terminated)) => terminated.started_at.as_ref(),
                (None, None) => None,
            }?;
            Some(container_sample(cs, unix_seconds(started)))
        })
        .collect()
}

fn last_terminated<F>(p: &Pod, value: F) -> Vec<Metric>
where
    F: Fn(&ContainerStateTerminated) -> Option<f64>,
{
    Containers::Regular
        .statuses(p)
        .iter()
        .filter_map(|cs| {
            let terminated = last(cs)?.terminated.as_ref()?;
            Some(container_sample(cs, value(terminated)?))
        })
        .collect()
}

fn info(p: &Pod) -> Vec<Metric> {
    let (kind, name) = controller_ref(p.metadata.owner_references.as_ref())
        .map(|o| (o.kind.clone(), o.name.clone()))
        .unwrap_or_default();
    let pod_spec = spec(p);
    let pod_status = status(p);
    vec![Metric::with_labels(
        [
            ("host_ip", pod_status.and_then(|s| s.host_ip.clone()).unwrap_or_default()),
            ("pod_ip", pod_status.and_then(|s| s.pod_ip.clone()).unwrap_or_default()),
            ("node", node_name(p)),
            ("created_by_kind", kind),
            ("created_by_name", name),
            (
                "priority_class",
                pod_spec.and_then(|s| s.priority_class_name.clone()).unwrap_or_default(),
            ),
            (
                "host_network",
                pod_spec.and_then(|s| s.host_network).unwrap_or(false).to_string(),
            ),
        ],
        1.0,
    )]
}

/// Addresses that do not parse are left out.
fn ips(p: &Pod) -> Vec<Metric> {
    status(p)
        .and_then(|s| s.pod_ips.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|ip| {
            let family = match ip.ip.parse::<IpAddr>().ok()? {
                IpAddr::V4(_) => "4",
                IpAddr::V6(_) => "6",
            };
            Some(Metric::with_labels(
                [("ip", ip.ip.as_str()), ("ip_family", family)],
                1.0,
            ))
        })
        .collect()
}

fn overhead<F>(p: &Pod, resource: &str, value: F) -> Vec<Metric>
where
    F: Fn(&kstate_core::ParsedQuantity) -> f64,
{
    spec(p)
        .and_then(|s| s.overhead.as_ref())
        .and_then(|o| o.get(resource))
        .and_then(|q| q.parsed().ok())
        .map(|q| vec![Metric::value_only(value(&q))])
        .unwrap_or_default()
}

fn pvc_volumes<F>(p: &Pod, value: F) -> Vec<Metric>
where
    F: Fn(Option<bool>) -> f64,
{
    spec(p)
        .and_then(|s| s.volumes.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|v| {
            let claim = v.persistent_volume_claim.as_ref()?;
            Some(Metric::with_labels(
                [
                    ("volume", v.name.as_str()),
                    ("persistentvolumeclaim", claim.claim_name.as_str()),
                ],
                value(claim.read_only),
            ))
        })
        .collect()
}

/// Transition time of the condition `type_` when it is in `status`.
fn condition_time(p: &Pod, type_: &str, cond_status: &str) -> Vec<Metric> {
    conditions(p)
        .iter()
        .filter(|c| c.type_ == type_ && c.status == cond_status)
        .map(|c| {
            Metric::value_only(c.last_transition_time.as_ref().map_or(0.0, unix_seconds))
        })
        .collect()
}

fn condition_state(p: &Pod, type_: &str) -> Vec<Metric> {
    conditions(p)
        .iter()
        .filter(|c| c.type_ == type_)
        .flat_map(|c| condition_metrics("condition", &c.status))
        .collect()
}

fn has_status_reason(p: &Pod, reason: &str) -> bool {
    let reason = Some(reason);
    status(p).and_then(|s| s.reason.as_deref()) == reason
        || conditions(p).iter().any(|c| c.reason.as_deref() == reason)
        || Containers::Regular.statuses(p).iter().any(|cs| {
            current(cs)
                .and_then(|s| s.terminated.as_ref())
                .is_some_and(|t| t.reason.as_deref() == reason)
        })
}

fn tolerations(p: &Pod) -> Vec<Metric> {
    let mut unique: Vec<&Toleration> = Vec::new();
    for t in spec(p).and_then(|s| s.tolerations.as_ref()).into_iter().flatten() {
        if !unique.contains(&t) {
            unique.push(t);
        }
    }
    unique
        .into_iter()
        .map(|t| {
            Metric::with_labels(
                [
                    ("key", t.key.clone().unwrap_or_default()),
                    ("operator", t.operator.clone().unwrap_or_default()),
                    ("value", t.value.clone().unwrap_or_default()),
                    ("effect", t.effect.clone().unwrap_or_default()),
                    (
                        "toleration_seconds",
                        t.toleration_seconds.map(|s| s.to_string()).unwrap_or_default(),
                    ),
                ],
                1.0,
            )
        })
        .collect()
}

fn gauge<F>(name: &str, help: &str, stability: StabilityLevel, f: F) -> FamilyGenerator<Pod>
where
    F: Fn(&Pod) -> Vec<Metric> + Send + Sync + 'static,
{
    FamilyGenerator::new(name, help, MetricType::Gauge, stability, f)
}

fn single_label<F>(p: &Pod, key: &str, value: F) -> Vec<Metric>
where
    F: Fn(&PodSpec) -> Option<String>,
{
    let v = spec(p).and_then(value).unwrap_or_default();
    vec![Metric::with_labels([(key, v)], 1.0)]
}

fn container_families() -> Vec<FamilyGenerator<Pod>> {
    use Containers::Regular;
    use StabilityLevel::{Alpha, Stable};

    vec![
        gauge(
            "kube_pod_completion_time",
            "Completion time in unix timestamp for a pod.",
            Stable,
            completion_time,
        ),
        gauge(
            "kube_pod_container_info",
            "Information about a container in a pod.",
            Stable,
            |p| container_info(p, Regular),
        ),
        gauge(
            "kube_pod_container_resource_limits",
            "The number of requested limit resource by a container. It is recommended to use the kube_pod_resource_limits metric exposed by kube-scheduler instead, as it is more precise.",
            Alpha,
            |p| container_resources(p, Regular, true),
        ),
        gauge(
            "kube_pod_container_resource_requests",
            "The number of requested request resource by a container. It is recommended to use the kube_pod_resource_requests metric exposed by kube-scheduler instead, as it is more precise.",
            Alpha,
            |p| container_resources(p, Regular, false),
        ),
        gauge(
            "kube_pod_container_state_started",
            "Start time in unix timestamp for a pod container.",
            Stable,
            state_started,
        ),
        gauge(
            "kube_pod_container_status_last_terminated_reason",
            "Describes the last reason the container was in terminated state.",
            Alpha,
            |p| {
                container_reasons(p, Regular, |cs| {
                    let t = last(cs)?.terminated.as_ref()?;
                    Some(t.reason.clone().unwrap_or_default())
                })
            },
        ),
        gauge(
            "kube_pod_container_status_last_terminated_exitcode",
            "Describes the exit code for the last container in terminated state.",
            Alpha,
            |p| last_terminated(p, |t| Some(f64::from(t.exit_code))),
        ),
        gauge(
            "kube_pod_container_status_last_terminated_timestamp",
            "Last terminated time for a pod container in unix timestamp.",
            Alpha,
            |p| last_terminated(p, |t| t.finished_at.as_ref().map(unix_seconds)),
        ),
        gauge(
            "kube_pod_container_status_ready",
            "Describes whether the containers readiness check succeeded.",
            Stable,
            |p| per_container(p, Regular, |cs| bool_f64(cs.ready)),
        ),
        FamilyGenerator::new(
            "kube_pod_container_status_restarts_total",
            "The number of container restarts per container.",
            MetricType::Counter,
            Stable,
            |p: &Pod| per_container(p, Regular, |cs| f64::from(cs.restart_count)),
        ),
        gauge(
            "kube_pod_container_status_running",
            "Describes whether the container is currently in running state.",
            Stable,
            |p| per_container(p, Regular, |cs| bool_f64(current(cs).is_some_and(|s| s.running.is_some()))),
        ),
        gauge(
            "kube_pod_container_status_terminated",
            "Describes whether the container is currently in terminated state.",
            Stable,
            |p| per_container(p, Regular, |cs| bool_f64(current(cs).is_some_and(|s| s.terminated.is_some()))),
        ),
        gauge(
            "kube_pod_container_status_terminated_reason",
            "Describes the reason the container is currently in terminated state.",
            Alpha,
            |p| {
                container_reasons(p, Regular, |cs| {
                    let t = current(cs)?.terminated.as_ref()?;
                    Some(t.reason.clone().unwrap_or_default())
                })
            },
        ),
        gauge(
            "kube_pod_container_status_waiting",
            "Describes whether the container is currently in waiting state.",
            Stable,
            |p| per_container(p, Regular, |cs| bool_f64(current(cs).is_some_and(|s| s.waiting.is_some()))),
        ),
        gauge(
            "kube_pod_container_status_waiting_reason",
            "Describes the reason the container is currently in waiting state.",
            Stable,
            |p| {
                container_reasons(p, Regular, |cs| {
                    let w = current(cs)?.waiting.as_ref()?;
                    Some(w.reason.clone().unwrap_or_default())
                })
            },
        ),
    ]
}

fn init_container_families() -> Vec<FamilyGenerator<Pod>> {
    use Containers::Init;
    use StabilityLevel::{Alpha, Stable};

    vec![
        gauge(
            "kube_pod_init_container_info",
            "Information about an init container in a pod.",
            Stable,
            |p| container_info(p, Init),
        ),
        gauge(
            "kube_pod_init_container_resource_limits",
            "The number of requested limit resource by an init container.",
            Alpha,
            |p| container_resources(p, Init, true),
        ),
        gauge(
            "kube_pod_init_container_resource_requests",
            "The number of requested request resource by an init container.",
            Alpha,
            |p| container_resources(p, Init, false),
        ),
        gauge(
            "kube_pod_init_container_status_last_terminated_reason",
            "Describes the last reason the init container was in terminated state.",
            Alpha,
            |p| {
                container_reasons(p, Init, |cs| {
                    let t = last(cs)?.terminated.as_ref()?;
                    Some(t.reason.clone().unwrap_or_default())
                })
            },
        ),
        gauge(
            "kube_pod_init_container_status_ready",
            "Describes whether the init containers readiness check succeeded.",
            Stable,
            |p| per_container(p, Init, |cs| bool_f64(cs.ready)),
        ),
        FamilyGenerator::new(
            "kube_pod_init_container_status_restarts_total",
            "The number of restarts for the init container.",
            MetricType::Counter,
            Stable,
            |p: &Pod| per_container(p, Init, |cs| f64::from(cs.restart_count)),
        ),
        gauge(
            "kube_pod_init_container_status_running",
            "Describes whether the init container is currently in running state.",
            Stable,
            |p| per_container(p, Init, |cs| bool_f64(current(cs).is_some_and(|s| s.running.is_some()))),
        ),
        gauge(
            "kube_pod_init_container_status_terminated",
            "Describes whether the init container is currently in terminated state.",
            Stable,
            |p| per_container(p, Init, |cs| bool_f64(current(cs).is_some_and(|s| s.terminated.is_some()))),
        ),
        gauge(
            "kube_pod_init_container_status_terminated_reason",
            "Describes the reason the init container is currently in terminated state.",
            Alpha,
            |p| {
                container_reasons(p, Init, |cs| {
                    let t = current(cs)?.terminated.as_ref()?;
                    Some(t.reason.clone().unwrap_or_default())
                })
            },
        ),
        gauge(
            "kube_pod_init_container_status_waiting",
            "Describes whether the init container is currently in waiting state.",
            Stable,
            |p| per_container(p, Init, |cs| bool_f64(current(cs).is_some_and(|s| s.waiting.is_some()))),
        ),
        gauge(
            "kube_pod_init_container_status_waiting_reason",
            "Describes the reason the init container is currently in waiting state.",
            Alpha,
            |p| {
                container_reasons(p, Init, |cs| {
                    let w = current(cs)?.waiting.as_ref()?;
                    Some(w.reason.clone().unwrap_or_default())
                })
            },
        ),
    ]
}

fn status_families() -> Vec<FamilyGenerator<Pod>> {
    use StabilityLevel::{Alpha, Stable};

    vec![
        gauge(
            "kube_pod_start_time",
            "Start time in unix timestamp for a pod.",
            Stable,
            |p| {
                status(p)
                    .and_then(|s| s.start_time.as_ref())
                    .map(|t| vec![Metric::value_only(unix_seconds(t))])
                    .unwrap_or_default()
            },
        ),
        gauge("kube_pod_status_phase", "The pods current phase.", Stable, |p| {
            let phase = status(p).and_then(|s| s.phase.as_deref()).unwrap_or_default();
            enum_state_metrics("phase", phase, &PHASES, EmptyPolicy::Skip)
        }),
        gauge(
            "kube_pod_status_qos_class",
            "The pods current qosClass.",
            Alpha,
            |p| {
                let class = status(p).and_then(|s| s.qos_class.as_deref()).unwrap_or_default();
                enum_state_metrics("qos_class", class, &QOS_CLASSES, EmptyPolicy::Skip)
            },
        ),
        gauge(
            "kube_pod_status_ready",
            "Describes whether the pod is ready to serve requests.",
            Stable,
            |p| condition_state(p, "Ready"),
        ),
        gauge(
            "kube_pod_status_ready_time",
            "Readiness achieved time in unix timestamp for a pod.",
            Alpha,
            |p| condition_time(p, "Ready", "True"),
        ),
        gauge(
            "kube_pod_status_initialized_time",
            "Initialized time in unix timestamp for a pod.",
            Alpha,
            |p| condition_time(p, "Initialized", "True"),
        ),
        gauge(
            "kube_pod_status_container_ready_time",
            "Readiness achieved time in unix timestamp for a pod containers.",
            Alpha,
            |p| condition_time(p, "ContainersReady", "True"),
        ),
        gauge("kube_pod_status_reason", "The pod status reasons", Alpha, |p| {
            STATUS_REASONS
                .iter()
                .map(|r| Metric::with_labels([("reason", *r)], bool_f64(has_status_reason(p, r))))
                .collect()
        }),
        gauge(
            "kube_pod_status_scheduled",
            "Describes the status of the scheduling process for the pod.",
            Stable,
            |p| condition_state(p, "PodScheduled"),
        ),
        gauge(
            "kube_pod_status_scheduled_time",
            "Unix timestamp when pod moved into scheduled status",
            Stable,
            |p| condition_time(p, "PodScheduled", "True"),
        ),
        gauge(
            "kube_pod_status_unschedulable",
            "Describes the unschedulable status for the pod.",
            Stable,
            |p| {
                conditions(p)
                    .iter()
                    .filter(|c| c.type_ == "PodScheduled" && c.status == "False")
                    .map(|_| Metric::value_only(1.0))
                    .collect()
            },
        ),
        gauge(
            "kube_pod_status_unscheduled_time",
            "Unix timestamp when pod moved into unscheduled status",
            Alpha,
            |p| condition_time(p, "PodScheduled", "False"),
        ),
    ]
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Pod>> {
    use StabilityLevel::{Alpha, Stable};

    let mut families = container_families();
    families.extend([
        created_family("pod", Stable),
        deletion_family("kube_pod_deletion_timestamp", Alpha),
        gauge("kube_pod_info", "Information about pod.", Stable, info),
        gauge("kube_pod_ips", "Pod IP addresses", Alpha, ips),
    ]);
    families.extend(init_container_families());
    families.extend([
        annotations_family("pod", Alpha, &allowed.annotations, EmptyAllowList::Skip),
        labels_family("pod", Stable, &allowed.labels, EmptyAllowList::Skip),
        gauge(
            "kube_pod_overhead_cpu_cores",
            "The pod overhead in regards to cpu cores associated with running a pod.",
            Alpha,
            |p| overhead(p, "cpu", |q| q.as_cores()),
        ),
        gauge(
            "kube_pod_overhead_memory_bytes",
            "The pod overhead in regards to memory associated with running a pod.",
            Alpha,
            |p| overhead(p, "memory", |q| q.value() as f64),
        ),
        gauge("kube_pod_owner", "Information about the Pod's owner.", Stable, |p| {
            owner_metrics(p.metadata.owner_references.as_ref(), "")
        }),
        gauge(
            "kube_pod_restart_policy",
            "Describes the restart policy in use by this pod.",
            Stable,
            |p| single_label(p, "type", |s| s.restart_policy.clone()),
        ),
        gauge(
            "kube_pod_runtimeclass_name_info",
            "The runtimeclass associated with the pod.",
            Alpha,
            |p| {
                spec(p)
                    .and_then(|s| s.runtime_class_name.as_deref())
                    .map(|name| vec![Metric::with_labels([("runtimeclass_name", name)], 1.0)])
                    .unwrap_or_default()
            },
        ),
        gauge(
            "kube_pod_spec_volumes_persistentvolumeclaims_info",
            "Information about persistentvolumeclaim volumes in a pod.",
            Stable,
            |p| pvc_volumes(p, |_| 1.0),
        ),
        gauge(
            "kube_pod_spec_volumes_persistentvolumeclaims_readonly",
            "Describes whether a persistentvolumeclaim is mounted read only.",
            Stable,
            |p| pvc_volumes(p, |ro| bool_f64(ro.unwrap_or(false))),
        ),
    ]);
    families.extend(status_families());
    families.extend([
        gauge(
            "kube_pod_tolerations",
            "Information about the pod tolerations",
            Alpha,
            tolerations,
        ),
        gauge(
            "kube_pod_nodeselectors",
            "Describes the Pod nodeSelectors.",
            Alpha,
            |p| {
                let empty = BTreeMap::new();
                let selectors = spec(p).and_then(|s| s.node_selector.as_ref()).unwrap_or(&empty);
                let (label_keys, label_values) = map_to_prometheus_labels("nodeselector", selectors);
                vec![Metric {
                    label_keys,
                    label_values,
                    value: 1.0,
                }]
            },
        )
        .opt_in(),
        gauge(
            "kube_pod_service_account",
            "The service account for a pod.",
            Alpha,
            |p| single_label(p, "service_account", |s| s.service_account_name.clone()),
        ),
        gauge("kube_pod_scheduler", "The scheduler for a pod.", Alpha, |p| {
            single_label(p, "name", |s| s.scheduler_name.clone())
        }),
    ]);

    with_identity(families, &["namespace", "pod", "uid"], |p: &Pod| {
        vec![
            p.metadata.namespace.clone().unwrap_or_default(),
            p.metadata.name.clone().unwrap_or_default(),
            p.metadata.uid.clone().unwrap_or_default(),
        ]
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    const ID: &str = "namespace=\"ns1\",pod=\"pod1\",uid=\"abc-0\"";

    fn pod(extra: serde_json::Value) -> Pod {
        let mut value = json!({
            "metadata": {"name": "pod1", "namespace": "ns1", "uid": "abc-0"},
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        fixture(value)
    }

    fn gens() -> Vec<FamilyGenerator<Pod>> {
        generators(&AllowedKeys::default())
    }

    #[test]
    fn labels_are_projected_with_identity() {
        let p: Pod = fixture(json!({
            "metadata": {
                "name": "pod1",
                "namespace": "ns1",
                "uid": "abc-0",
                "labels": {"app": "foobar"},
            }
        }));
        let allowed = AllowedKeys {
            labels: vec!["app".to_string()],
            annotations: vec![],
        };
        let families: Vec<_> = generators(&allowed)
            .into_iter()
            .filter(|g| g.name == "kube_pod_labels")
            .collect();
        let family = families[0].generate(&p);
        assert_eq!(family.metrics.len(), 1);
        assert_eq!(family.metrics[0].label_keys, vec!["namespace", "pod", "uid", "label_app"]);
        assert_eq!(family.metrics[0].label("label_app"), Some("foobar"));
        assert_eq!(family.metrics[0].value, 1.0);
    }

    #[test]
    fn colliding_label_names_get_conflict_suffixes() {
        let p: Pod = fixture(json!({
            "metadata": {
                "name": "pod1",
                "namespace": "ns1",
                "uid": "abc-0",
                "labels": {"app_kubernetes_io": "b", "app.kubernetes.io": "a", "team": "core"},
            }
        }));
        let listed = AllowedKeys {
            labels: vec!["app_kubernetes_io".to_string(), "app.kubernetes.io".to_string()],
            annotations: vec![],
        };
        assert_eq!(
            samples(&generators(&listed), &p, "kube_pod_labels"),
            vec![format!(
                "kube_pod_labels{{{ID},label_app_kubernetes_io_conflict1=\"a\",label_app_kubernetes_io_conflict2=\"b\"}} 1"
            )]
        );

        let everything = AllowedKeys {
            labels: vec!["*".to_string()],
            annotations: vec![],
        };
        assert_eq!(
            samples(&generators(&everything), &p, "kube_pod_labels"),
            vec![format!(
                "kube_pod_labels{{{ID},label_app_kubernetes_io_conflict1=\"a\",label_app_kubernetes_io_conflict2=\"b\",label_team=\"core\"}} 1"
            )]
        );
    }

    #[test]
    fn labels_are_skipped_without_allow_list() {
        let p = pod(json!({}));
        assert!(samples(&gens(), &p, "kube_pod_labels").is_empty());
        assert!(samples(&gens(), &p, "kube_pod_annotations").is_empty());
    }

    #[test]
    fn container_status_families() {
        let p = pod(json!({
            "spec": {
                "nodeName": "node1",
                "containers": [{
                    "name": "container1",
                    "image": "k8s.gcr.io/hyperkube1_spec",
                    "resources": {"requests": {"cpu": "200m", "memory": "100M"}},
                }],
            },
            "status": {
                "containerStatuses": [{
                    "name": "container1",
                    "image": "k8s.gcr.io/hyperkube1",
                    "imageID": "docker://sha256:aaa",
                    "containerID": "docker://ab123",
                    "ready": true,
                    "restartCount": 3,
                    "state": {"waiting": {"reason": "CrashLoopBackOff"}},
                    "lastState": {"terminated": {
                        "exitCode": 137,
                        "reason": "OOMKilled",
                        "finishedAt": "2017-09-20T10:06:40Z",
                    }},
                }],
            },
        }));
        let g = gens();
        assert_eq!(
            samples(&g, &p, "kube_pod_container_info"),
            vec![format!(
                "kube_pod_container_info{{{ID},container=\"container1\",image_spec=\"k8s.gcr.io/hyperkube1_spec\",\
                 image=\"k8s.gcr.io/hyperkube1\",image_id=\"docker://sha256:aaa\",container_id=\"docker://ab123\"}} 1"
            )]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_container_status_restarts_total"),
            vec![format!("kube_pod_container_status_restarts_total{{{ID},container=\"container1\"}} 3")]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_container_status_waiting_reason"),
            vec![format!(
                "kube_pod_container_status_waiting_reason{{{ID},container=\"container1\",reason=\"CrashLoopBackOff\"}} 1"
            )]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_container_status_running"),
            vec![format!("kube_pod_container_status_running{{{ID},container=\"container1\"}} 0")]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_container_status_last_terminated_exitcode"),
            vec![format!("kube_pod_container_status_last_terminated_exitcode{{{ID},container=\"container1\"}} 137")]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_container_status_last_terminated_reason"),
            vec![format!(
                "kube_pod_container_status_last_terminated_reason{{{ID},container=\"container1\",reason=\"OOMKilled\"}} 1"
            )]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_container_resource_requests"),
            vec![
                format!(
                    "kube_pod_container_resource_requests{{{ID},container=\"container1\",node=\"node1\",resource=\"cpu\",unit=\"core\"}} 0.2"
                ),
                format!(
                    "kube_pod_container_resource_requests{{{ID},container=\"container1\",node=\"node1\",resource=\"memory\",unit=\"byte\"}} 1e+08"
                ),
            ]
        );
    }

    #[test]
    fn restarts_family_is_a_counter() {
        let g = gens();
        let restarts = g
            .iter()
            .find(|g| g.name == "kube_pod_container_status_restarts_total")
            .map(|g| g.header());
        assert_eq!(
            restarts.as_deref(),
            Some(
                "# HELP kube_pod_container_status_restarts_total [STABLE] The number of container restarts per container.\n\
                 # TYPE kube_pod_container_status_restarts_total counter"
            )
        );
    }

    #[test]
    fn phase_and_qos_are_skipped_when_unset() {
        let p = pod(json!({}));
        assert!(samples(&gens(), &p, "kube_pod_status_phase").is_empty());
        assert!(samples(&gens(), &p, "kube_pod_status_qos_class").is_empty());

        let running = pod(json!({"status": {"phase": "Running", "qosClass": "Burstable"}}));
        let phases = samples(&gens(), &running, "kube_pod_status_phase");
        assert_eq!(phases.len(), 5);
        assert_eq!(phases[4], format!("kube_pod_status_phase{{{ID},phase=\"Running\"}} 1"));
        assert!(samples(&gens(), &running, "kube_pod_status_qos_class")
            .contains(&format!("kube_pod_status_qos_class{{{ID},qos_class=\"Burstable\"}} 1")));
    }

    #[test]
    fn info_uses_controller_owner() {
        let p: Pod = fixture(json!({
            "metadata": {
                "name": "pod1",
                "namespace": "ns1",
                "uid": "abc-0",
                "ownerReferences": [
                    {"apiVersion": "apps/v1", "kind": "ReplicaSet", "name": "rs-abc", "uid": "u", "controller": true},
                ],
            },
            "spec": {"containers": [], "nodeName": "node1", "priorityClassName": "system-node-critical", "hostNetwork": true},
            "status": {"hostIP": "1.1.1.1", "podIP": "1.2.3.4"},
        }));
        assert_eq!(
            samples(&gens(), &p, "kube_pod_info"),
            vec![format!(
                "kube_pod_info{{{ID},host_ip=\"1.1.1.1\",pod_ip=\"1.2.3.4\",node=\"node1\",created_by_kind=\"ReplicaSet\",\
                 created_by_name=\"rs-abc\",priority_class=\"system-node-critical\",host_network=\"true\"}} 1"
            )]
        );
        assert_eq!(
            samples(&gens(), &p, "kube_pod_owner"),
            vec![format!(
                "kube_pod_owner{{{ID},owner_kind=\"ReplicaSet\",owner_name=\"rs-abc\",owner_is_controller=\"true\"}} 1"
            )]
        );
    }

    #[test]
    fn owner_placeholder_is_empty() {
        assert_eq!(
            samples(&gens(), &pod(json!({})), "kube_pod_owner"),
            vec![format!("kube_pod_owner{{{ID},owner_kind=\"\",owner_name=\"\",owner_is_controller=\"\"}} 1")]
        );
    }

    #[test]
    fn ips_carry_their_family() {
        let p = pod(json!({"status": {"podIPs": [{"ip": "1.2.3.4"}, {"ip": "fd00::1"}, {"ip": "nope"}]}}));
        assert_eq!(
            samples(&gens(), &p, "kube_pod_ips"),
            vec![
                format!("kube_pod_ips{{{ID},ip=\"1.2.3.4\",ip_family=\"4\"}} 1"),
                format!("kube_pod_ips{{{ID},ip=\"fd00::1\",ip_family=\"6\"}} 1"),
            ]
        );
    }

    #[test]
    fn scheduling_conditions() {
        let p = pod(json!({"status": {"conditions": [
            {"type": "PodScheduled", "status": "False", "lastTransitionTime": "2017-09-20T10:06:40Z", "reason": "Unschedulable"},
        ]}}));
        let g = gens();
        assert_eq!(
            samples(&g, &p, "kube_pod_status_scheduled"),
            vec![
                format!("kube_pod_status_scheduled{{{ID},condition=\"true\"}} 0"),
                format!("kube_pod_status_scheduled{{{ID},condition=\"false\"}} 1"),
                format!("kube_pod_status_scheduled{{{ID},condition=\"unknown\"}} 0"),
            ]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_status_unschedulable"),
            vec![format!("kube_pod_status_unschedulable{{{ID}}} 1")]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_status_unscheduled_time"),
            vec![format!("kube_pod_status_unscheduled_time{{{ID}}} 1.505902e+09")]
        );
        assert!(samples(&g, &p, "kube_pod_status_scheduled_time").is_empty());
    }

    #[test]
    fn status_reason_checks_pod_and_containers() {
        let p = pod(json!({
            "status": {
                "reason": "Evicted",
                "containerStatuses": [{
                    "name": "c", "image": "", "imageID": "", "ready": false, "restartCount": 0,
                    "state": {"terminated": {"exitCode": 1, "reason": "Shutdown"}},
                }],
            }
        }));
        let reasons = samples(&gens(), &p, "kube_pod_status_reason");
        assert_eq!(
            reasons,
            vec![
                format!("kube_pod_status_reason{{{ID},reason=\"Evicted\"}} 1"),
                format!("kube_pod_status_reason{{{ID},reason=\"NodeAffinity\"}} 0"),
                format!("kube_pod_status_reason{{{ID},reason=\"NodeLost\"}} 0"),
                format!("kube_pod_status_reason{{{ID},reason=\"Shutdown\"}} 1"),
                format!("kube_pod_status_reason{{{ID},reason=\"UnexpectedAdmissionError\"}} 0"),
            ]
        );
    }

    #[test]
    fn duplicate_tolerations_are_collapsed() {
        let p = pod(json!({"spec": {"containers": [], "tolerations": [
            {"key": "key1", "operator": "Equal", "value": "value1", "effect": "NoSchedule"},
            {"key": "key1", "operator": "Equal", "value": "value1", "effect": "NoSchedule"},
            {"key": "key2", "operator": "Exists", "tolerationSeconds": 300},
        ]}}));
        assert_eq!(
            samples(&gens(), &p, "kube_pod_tolerations"),
            vec![
                format!(
                    "kube_pod_tolerations{{{ID},key=\"key1\",operator=\"Equal\",value=\"value1\",effect=\"NoSchedule\",toleration_seconds=\"\"}} 1"
                ),
                format!(
                    "kube_pod_tolerations{{{ID},key=\"key2\",operator=\"Exists\",value=\"\",effect=\"\",toleration_seconds=\"300\"}} 1"
                ),
            ]
        );
    }

    #[test]
    fn pvc_volumes_and_overhead() {
        let p = pod(json!({"spec": {
            "containers": [],
            "overhead": {"cpu": "250m", "memory": "120M"},
            "volumes": [
                {"name": "myvol", "persistentVolumeClaim": {"claimName": "claim1", "readOnly": true}},
                {"name": "tmp", "emptyDir": {}},
            ],
        }}));
        let g = gens();
        assert_eq!(
            samples(&g, &p, "kube_pod_spec_volumes_persistentvolumeclaims_readonly"),
            vec![format!(
                "kube_pod_spec_volumes_persistentvolumeclaims_readonly{{{ID},volume=\"myvol\",persistentvolumeclaim=\"claim1\"}} 1"
            )]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_overhead_cpu_cores"),
            vec![format!("kube_pod_overhead_cpu_cores{{{ID}}} 0.25")]
        );
        assert_eq!(
            samples(&g, &p, "kube_pod_overhead_memory_bytes"),
            vec![format!("kube_pod_overhead_memory_bytes{{{ID}}} 1.2e+08")]
        );
    }

    #[test]
    fn nodeselectors_family_is_opt_in() {
        let g = gens();
        let nodeselectors = g.iter().find(|g| g.name == "kube_pod_nodeselectors");
        assert!(nodeselectors.is_some_and(|g| g.opt_in));
        let p = pod(json!({"spec": {"containers": [], "nodeSelector": {"kubernetes.io/os": "linux"}}}));
        assert_eq!(
            samples(&g, &p, "kube_pod_nodeselectors"),
            vec![format!("kube_pod_nodeselectors{{{ID},nodeselector_kubernetes_io_os=\"linux\"}} 1")]
        );
    }
}
