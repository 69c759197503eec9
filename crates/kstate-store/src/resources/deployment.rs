use k8s_openapi::{
    api::apps::v1::{Deployment, DeploymentStatus, RollingUpdateDeployment},
    apimachinery::pkg::util::intstr::IntOrString,
};
use kstate_core::{FamilyGenerator, state::{bool_f64, status_condition_metrics}, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
    value_family,
};

/// Absolute value of an int-or-percent against `total`; `None` for malformed percents.
fn scaled_value(v: &IntOrString, total: i32, round_up: bool) -> Option<f64> {
    match v {
        IntOrString::Int(i) => Some(f64::from(*i)),
        IntOrString::String(s) => {
            let percent: f64 = s.strip_suffix('%')?.parse::<i32>().ok()?.into();
            let raw = percent * f64::from(total) / 100.0;
            Some(if round_up { raw.ceil() } else { raw.floor() })
        }
    }
}

fn rolling_update<F>(d: &Deployment, field: F, round_up: bool) -> Vec<Metric>
where
    F: Fn(&RollingUpdateDeployment) -> Option<&IntOrString>,
{
    let Some(spec) = d.spec.as_ref() else {
        return Vec::new();
    };
    let replicas = spec.replicas.unwrap_or(1);
    spec.strategy
        .as_ref()
        .and_then(|s| s.rolling_update.as_ref())
        .and_then(field)
        .and_then(|v| scaled_value(v, replicas, round_up))
        .map(|v| vec![Metric::value_only(v)])
        .unwrap_or_default()
}

fn status<F>(d: &Deployment, f: F) -> f64
where
    F: Fn(&DeploymentStatus) -> Option<i32>,
{
    d.status.as_ref().and_then(f).map_or(0.0, f64::from)
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Deployment>> {
    with_identity(
        vec![
            created_family("deployment", StabilityLevel::Alpha),
            value_family(
                "kube_deployment_status_replicas",
                "The number of replicas per deployment.",
                StabilityLevel::Alpha,
                |d: &Deployment| status(d, |s| s.replicas),
            ),
            value_family(
                "kube_deployment_status_replicas_ready",
                "The number of ready replicas per deployment.",
                StabilityLevel::Alpha,
                |d: &Deployment| status(d, |s| s.ready_replicas),
            ),
            value_family(
                "kube_deployment_status_replicas_available",
                "The number of available replicas per deployment.",
                StabilityLevel::Alpha,
                |d: &Deployment| status(d, |s| s.available_replicas),
            ),
            value_family(
                "kube_deployment_status_replicas_unavailable",
                "The number of unavailable replicas per deployment.",
                StabilityLevel::Alpha,
                |d: &Deployment| status(d, |s| s.unavailable_replicas),
            ),
            value_family(
                "kube_deployment_status_replicas_updated",
                "The number of updated replicas per deployment.",
                StabilityLevel::Alpha,
                |d: &Deployment| status(d, |s| s.updated_replicas),
            ),
            value_family(
                "kube_deployment_status_observed_generation",
                "The generation observed by the deployment controller.",
                StabilityLevel::Alpha,
                |d: &Deployment| {
                    d.status
                        .as_ref()
                        .and_then(|s| s.observed_generation)
                        .unwrap_or(0) as f64
                },
            ),
            FamilyGenerator::new(
                "kube_deployment_status_condition",
                "The current status conditions of a deployment.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |d: &Deployment| {
                    d.status
                        .as_ref()
                        .and_then(|s| s.conditions.as_ref())
                        .into_iter()
                        .flatten()
                        .flat_map(|c| status_condition_metrics(&c.type_, &c.status))
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_deployment_spec_replicas",
                "Number of desired pods for a deployment.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |d: &Deployment| crate::common::opt_value(d.spec.as_ref().and_then(|s| s.replicas)),
            ),
            value_family(
                "kube_deployment_spec_paused",
                "Whether the deployment is paused and will not be processed by the deployment controller.",
                StabilityLevel::Alpha,
                |d: &Deployment| bool_f64(d.spec.as_ref().and_then(|s| s.paused).unwrap_or(false)),
            ),
            FamilyGenerator::new(
                "kube_deployment_spec_strategy_rollingupdate_max_unavailable",
                "Maximum number of unavailable replicas during a rolling update of a deployment.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |d: &Deployment| rolling_update(d, |r| r.max_unavailable.as_ref(), false),
            ),
            FamilyGenerator::new(
                "kube_deployment_spec_strategy_rollingupdate_max_surge",
                "Maximum number of replicas that can be scheduled above the desired number of replicas during a rolling update of a deployment.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |d: &Deployment| rolling_update(d, |r| r.max_surge.as_ref(), true),
            ),
            value_family(
                "kube_deployment_metadata_generation",
                "Sequence number representing a specific generation of the desired state.",
                StabilityLevel::Alpha,
                |d: &Deployment| d.metadata.generation.unwrap_or(0) as f64,
            ),
            annotations_family(
                "deployment",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::IdentityOnly,
            ),
            labels_family(
                "deployment",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
        ],
        &["namespace", "deployment"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    fn deployment() -> Deployment {
        fixture(json!({
            "metadata": {
                "name": "depl1",
                "namespace": "ns1",
                "generation": 21,
                "labels": {"app": "example1"},
            },
            "spec": {
                "replicas": 200,
                "paused": true,
                "selector": {},
                "template": {},
                "strategy": {"rollingUpdate": {"maxUnavailable": "10%", "maxSurge": "5%"}},
            },
            "status": {
                "replicas": 15,
                "availableReplicas": 10,
                "unavailableReplicas": 5,
                "updatedReplicas": 2,
                "observedGeneration": 111,
                "conditions": [{"type": "Available", "status": "True"}],
            },
        }))
    }

    fn value(family: &str) -> Vec<String> {
        samples(&generators(&AllowedKeys::default()), &deployment(), family)
    }

    #[test]
    fn replica_counts_default_to_zero() {
        assert_eq!(
            value("kube_deployment_status_replicas_ready"),
            vec!["kube_deployment_status_replicas_ready{namespace=\"ns1\",deployment=\"depl1\"} 0"]
        );
        assert_eq!(
            value("kube_deployment_status_replicas_unavailable"),
            vec!["kube_deployment_status_replicas_unavailable{namespace=\"ns1\",deployment=\"depl1\"} 5"]
        );
    }

    #[test]
    fn rolling_update_percentages_are_scaled() {
        assert_eq!(
            value("kube_deployment_spec_strategy_rollingupdate_max_unavailable"),
            vec!["kube_deployment_spec_strategy_rollingupdate_max_unavailable{namespace=\"ns1\",deployment=\"depl1\"} 20"]
        );
        assert_eq!(
            value("kube_deployment_spec_strategy_rollingupdate_max_surge"),
            vec!["kube_deployment_spec_strategy_rollingupdate_max_surge{namespace=\"ns1\",deployment=\"depl1\"} 10"]
        );
    }

    #[test]
    fn scaled_value_rounding() {
        let p = IntOrString::String("25%".to_string());
        assert_eq!(scaled_value(&p, 3, false), Some(0.0));
        assert_eq!(scaled_value(&p, 3, true), Some(1.0));
        assert_eq!(scaled_value(&IntOrString::Int(4), 3, true), Some(4.0));
        assert_eq!(scaled_value(&IntOrString::String("x".to_string()), 3, true), None);
    }

    #[test]
    fn paused_generation_and_conditions() {
        assert_eq!(
            value("kube_deployment_spec_paused"),
            vec!["kube_deployment_spec_paused{namespace=\"ns1\",deployment=\"depl1\"} 1"]
        );
        assert_eq!(
            value("kube_deployment_metadata_generation"),
            vec!["kube_deployment_metadata_generation{namespace=\"ns1\",deployment=\"depl1\"} 21"]
        );
        assert_eq!(value("kube_deployment_status_condition").len(), 3);
        assert_eq!(
            value("kube_deployment_labels"),
            vec!["kube_deployment_labels{namespace=\"ns1\",deployment=\"depl1\"} 1"]
        );
    }
}
