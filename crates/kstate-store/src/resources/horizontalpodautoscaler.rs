use k8s_openapi::{
    api::autoscaling::v2::{
        HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec, HorizontalPodAutoscalerStatus,
        MetricSpec, MetricStatus,
    },
    apimachinery::pkg::api::resource::Quantity,
};
use kstate_core::{FamilyGenerator, QuantityExt, state::status_condition_metrics, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, labels_family, namespace_name, value_family,
};

fn spec(hpa: &HorizontalPodAutoscaler) -> Option<&HorizontalPodAutoscalerSpec> {
    hpa.spec.as_ref()
}

fn status(hpa: &HorizontalPodAutoscaler) -> Option<&HorizontalPodAutoscalerStatus> {
    hpa.status.as_ref()
}

/// Target or current values of one metric source, keyed by `metric_target_type`.
struct Values<'a> {
    value: Option<&'a Quantity>,
    average: Option<&'a Quantity>,
    utilization: Option<i32>,
}

impl Values<'_> {
    fn metrics(&self, name: &str) -> Vec<Metric> {
        let quantity = |q: Option<&Quantity>| q.and_then(|q| q.parsed().ok()).map(|p| p.as_cores());
        [
            ("value", quantity(self.value)),
            ("utilization", self.utilization.map(f64::from)),
            ("average", quantity(self.average)),
        ]
        .into_iter()
        .filter_map(|(kind, v)| {
            v.map(|v| Metric::with_labels([("metric_name", name), ("metric_target_type", kind)], v))
        })
        .collect()
    }
}

fn target_values(m: &MetricSpec) -> Option<(&str, Values<'_>)> {
    let (name, t) = match m.type_.as_str() {
        "Object" => m.object.as_ref().map(|s| (s.metric.name.as_str(), &s.target))?,
        "Pods" => m.pods.as_ref().map(|s| (s.metric.name.as_str(), &s.target))?,
        "Resource" => m.resource.as_ref().map(|s| (s.name.as_str(), &s.target))?,
        "ContainerResource" => m.container_resource.as_ref().map(|s| (s.name.as_str(), &s.target))?,
        "External" => m.external.as_ref().map(|s| (s.metric.name.as_str(), &s.target))?,
        _ => return None,
    };
    Some((
        name,
        Values {
            value: t.value.as_ref(),
            average: t.average_value.as_ref(),
            utilization: t.average_utilization,
        },
    ))
}

fn current_values(m: &MetricStatus) -> Option<(&str, Values<'_>)> {
    let (name, c) = match m.type_.as_str() {
        "Object" => m.object.as_ref().map(|s| (s.metric.name.as_str(), &s.current))?,
        "Pods" => m.pods.as_ref().map(|s| (s.metric.name.as_str(), &s.current))?,
        "Resource" => m.resource.as_ref().map(|s| (s.name.as_str(), &s.current))?,
        "ContainerResource" => m.container_resource.as_ref().map(|s| (s.name.as_str(), &s.current))?,
        "External" => m.external.as_ref().map(|s| (s.metric.name.as_str(), &s.current))?,
        _ => return None,
    };
    Some((
        name,
        Values {
            value: c.value.as_ref(),
            average: c.average_value.as_ref(),
            utilization: c.average_utilization,
        },
    ))
}

fn info(hpa: &HorizontalPodAutoscaler) -> Vec<Metric> {
    let Some(target) = spec(hpa).map(|s| &s.scale_target_ref) else {
        return Vec::new();
    };
    let mut pairs = Vec::with_capacity(3);
    if let Some(api_version) = target.api_version.as_deref().filter(|v| !v.is_empty()) {
        pairs.push(("scaletargetref_api_version", api_version));
    }
    pairs.push(("scaletargetref_kind", target.kind.as_str()));
    pairs.push(("scaletargetref_name", target.name.as_str()));
    vec![Metric::with_labels(pairs, 1.0)]
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<HorizontalPodAutoscaler>> {
    use StabilityLevel::{Alpha, Stable};

    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_horizontalpodautoscaler_info",
                "Information about this autoscaler.",
                MetricType::Gauge,
                Alpha,
                info,
            ),
            value_family(
                "kube_horizontalpodautoscaler_metadata_generation",
                "The generation observed by the HorizontalPodAutoscaler controller.",
                Stable,
                |hpa: &HorizontalPodAutoscaler| hpa.metadata.generation.unwrap_or(0) as f64,
            ),
            value_family(
                "kube_horizontalpodautoscaler_spec_max_replicas",
                "Upper limit for the number of pods that can be set by the autoscaler; cannot be smaller than MinReplicas.",
                Stable,
                |hpa: &HorizontalPodAutoscaler| spec(hpa).map_or(0.0, |s| f64::from(s.max_replicas)),
            ),
            value_family(
                "kube_horizontalpodautoscaler_spec_min_replicas",
                "Lower limit for the number of pods that can be set by the autoscaler, default 1.",
                Stable,
                |hpa: &HorizontalPodAutoscaler| f64::from(spec(hpa).and_then(|s| s.min_replicas).unwrap_or(1)),
            ),
            FamilyGenerator::new(
                "kube_horizontalpodautoscaler_spec_target_metric",
                "The metric specifications used by this autoscaler when calculating the desired replica count.",
                MetricType::Gauge,
                Alpha,
                |hpa: &HorizontalPodAutoscaler| {
                    spec(hpa)
                        .and_then(|s| s.metrics.as_deref())
                        .unwrap_or_default()
                        .iter()
                        .filter_map(target_values)
                        .flat_map(|(name, values)| values.metrics(name))
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_horizontalpodautoscaler_status_target_metric",
                "The current metric status used by this autoscaler when calculating the desired replica count.",
                MetricType::Gauge,
                Alpha,
                |hpa: &HorizontalPodAutoscaler| {
                    status(hpa)
                        .and_then(|s| s.current_metrics.as_deref())
                        .unwrap_or_default()
                        .iter()
                        .filter_map(current_values)
                        .flat_map(|(name, values)| values.metrics(name))
                        .collect()
                },
            ),
            value_family(
                "kube_horizontalpodautoscaler_status_current_replicas",
                "Current number of replicas of pods managed by this autoscaler.",
                Stable,
                |hpa: &HorizontalPodAutoscaler| {
                    f64::from(status(hpa).and_then(|s| s.current_replicas).unwrap_or(0))
                },
            ),
            value_family(
                "kube_horizontalpodautoscaler_status_desired_replicas",
                "Desired number of replicas of pods managed by this autoscaler.",
                Stable,
                |hpa: &HorizontalPodAutoscaler| status(hpa).map_or(0.0, |s| f64::from(s.desired_replicas)),
            ),
            annotations_family(
                "horizontalpodautoscaler",
                Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "horizontalpodautoscaler",
                Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            FamilyGenerator::new(
                "kube_horizontalpodautoscaler_status_condition",
                "The condition of this autoscaler.",
                MetricType::Gauge,
                Stable,
                |hpa: &HorizontalPodAutoscaler| {
                    status(hpa)
                        .and_then(|s| s.conditions.as_deref())
                        .unwrap_or_default()
                        .iter()
                        .flat_map(|c| status_condition_metrics(&c.type_, &c.status))
                        .collect()
                },
            ),
        ],
        &["namespace", "horizontalpodautoscaler"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    const ID: &str = "namespace=\"ns1\",horizontalpodautoscaler=\"hpa1\"";

    fn hpa() -> HorizontalPodAutoscaler {
        fixture(json!({
            "metadata": {"name": "hpa1", "namespace": "ns1", "generation": 2},
            "spec": {
                "maxReplicas": 4,
                "minReplicas": 2,
                "scaleTargetRef": {"apiVersion": "apps/v1", "kind": "Deployment", "name": "deployment1"},
                "metrics": [
                    {"type": "Resource", "resource": {"name": "memory", "target": {"type": "Utilization", "averageUtilization": 80, "averageValue": "800Ki"}}},
                    {"type": "Resource", "resource": {"name": "cpu", "target": {"type": "Utilization", "averageUtilization": 80}}},
                    {"type": "Object", "object": {
                        "metric": {"name": "hits"},
                        "describedObject": {"apiVersion": "v1", "kind": "Service", "name": "frontend"},
                        "target": {"type": "Value", "value": "10", "averageValue": "12"},
                    }},
                    {"type": "External", "external": {"metric": {"name": "sqs_jobs"}, "target": {"type": "Value", "value": "30"}}},
                ],
            },
            "status": {
                "currentReplicas": 2,
                "desiredReplicas": 2,
                "currentMetrics": [
                    {"type": "Resource", "resource": {"name": "cpu", "current": {"averageUtilization": 7, "averageValue": "6m"}}},
                ],
                "conditions": [{"type": "AbleToScale", "status": "True"}],
            },
        }))
    }

    #[test]
    fn spec_targets_per_type() {
        assert_eq!(
            samples(&generators(&AllowedKeys::default()), &hpa(), "kube_horizontalpodautoscaler_spec_target_metric"),
            vec![
                format!("kube_horizontalpodautoscaler_spec_target_metric{{{ID},metric_name=\"memory\",metric_target_type=\"utilization\"}} 80"),
                format!("kube_horizontalpodautoscaler_spec_target_metric{{{ID},metric_name=\"memory\",metric_target_type=\"average\"}} 819200"),
                format!("kube_horizontalpodautoscaler_spec_target_metric{{{ID},metric_name=\"cpu\",metric_target_type=\"utilization\"}} 80"),
                format!("kube_horizontalpodautoscaler_spec_target_metric{{{ID},metric_name=\"hits\",metric_target_type=\"value\"}} 10"),
                format!("kube_horizontalpodautoscaler_spec_target_metric{{{ID},metric_name=\"hits\",metric_target_type=\"average\"}} 12"),
                format!("kube_horizontalpodautoscaler_spec_target_metric{{{ID},metric_name=\"sqs_jobs\",metric_target_type=\"value\"}} 30"),
            ]
        );
    }

    #[test]
    fn status_metrics_and_conditions() {
        let gens = generators(&AllowedKeys::default());
        let h = hpa();
        assert_eq!(
            samples(&gens, &h, "kube_horizontalpodautoscaler_status_target_metric"),
            vec![
                format!("kube_horizontalpodautoscaler_status_target_metric{{{ID},metric_name=\"cpu\",metric_target_type=\"utilization\"}} 7"),
                format!("kube_horizontalpodautoscaler_status_target_metric{{{ID},metric_name=\"cpu\",metric_target_type=\"average\"}} 0.006"),
            ]
        );
        assert_eq!(
            samples(&gens, &h, "kube_horizontalpodautoscaler_status_condition"),
            vec![
                format!("kube_horizontalpodautoscaler_status_condition{{{ID},condition=\"AbleToScale\",status=\"true\"}} 1"),
                format!("kube_horizontalpodautoscaler_status_condition{{{ID},condition=\"AbleToScale\",status=\"false\"}} 0"),
                format!("kube_horizontalpodautoscaler_status_condition{{{ID},condition=\"AbleToScale\",status=\"unknown\"}} 0"),
            ]
        );
    }

    #[test]
    fn info_and_replica_bounds() {
        let gens = generators(&AllowedKeys::default());
        let h = hpa();
        assert_eq!(
            samples(&gens, &h, "kube_horizontalpodautoscaler_info"),
            vec![format!("kube_horizontalpodautoscaler_info{{{ID},scaletargetref_api_version=\"apps/v1\",scaletargetref_kind=\"Deployment\",scaletargetref_name=\"deployment1\"}} 1")]
        );
        assert_eq!(
            samples(&gens, &h, "kube_horizontalpodautoscaler_spec_max_replicas"),
            vec![format!("kube_horizontalpodautoscaler_spec_max_replicas{{{ID}}} 4")]
        );
        assert_eq!(
            samples(&gens, &h, "kube_horizontalpodautoscaler_spec_min_replicas"),
            vec![format!("kube_horizontalpodautoscaler_spec_min_replicas{{{ID}}} 2")]
        );
        assert!(samples(&gens, &h, "kube_horizontalpodautoscaler_labels").is_empty());
    }
}
