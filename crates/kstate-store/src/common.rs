//! Families and sample builders shared by most resource types.

use std::{collections::BTreeMap, sync::Arc};

use k8s_openapi::{
    Metadata,
    api::core::v1::ResourceRequirements,
    apimachinery::pkg::{
        api::resource::Quantity,
        apis::meta::v1::{ObjectMeta, OwnerReference},
    },
};
use kstate_core::{
    FamilyGenerator, QuantityExt, ResourceUnit, create_prometheus_label_keys_values,
    labels::sanitize_label_name, state::timestamp_metric,
};
use kstate_model::{Metric, MetricType, StabilityLevel};

pub(crate) const LABELS_HELP: &str = "Kubernetes labels converted to Prometheus labels.";
pub(crate) const ANNOTATIONS_HELP: &str = "Kubernetes annotations converted to Prometheus labels.";
pub(crate) const CREATED_HELP: &str = "Unix creation timestamp";
pub(crate) const DELETED_HELP: &str = "Unix deletion timestamp";

/// What a labels/annotations family emits when its allow-list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmptyAllowList {
    /// No sample.
    Skip,
    /// One sample carrying the identity labels only.
    IdentityOnly,
}

/// Labels and annotations allowed for one resource.
#[derive(Debug, Clone, Default)]
pub struct AllowedKeys {
    pub labels: Vec<String>,
    pub annotations: Vec<String>,
}

fn projected(
    prefix: &str,
    map: Option<&BTreeMap<String, String>>,
    allowed: &[String],
    policy: EmptyAllowList,
) -> Vec<Metric> {
    if allowed.is_empty() && policy == EmptyAllowList::Skip {
        return Vec::new();
    }
    let (label_keys, label_values) = create_prometheus_label_keys_values(prefix, map, allowed);
    vec![Metric {
        label_keys,
        label_values,
        value: 1.0,
    }]
}

/// `kube_<resource>_labels` over the allow-listed object labels.
pub(crate) fn labels_family<K>(
    resource: &str,
    stability: StabilityLevel,
    allowed: &[String],
    policy: EmptyAllowList,
) -> FamilyGenerator<K>
where
    K: Metadata<Ty = ObjectMeta> + 'static,
{
    let allowed: Arc<[String]> = allowed.into();
    FamilyGenerator::new(
        &format!("kube_{resource}_labels"),
        LABELS_HELP,
        MetricType::Gauge,
        stability,
        move |obj: &K| projected("label", obj.metadata().labels.as_ref(), &allowed, policy),
    )
}

/// `kube_<resource>_annotations` over the allow-listed object annotations.
pub(crate) fn annotations_family<K>(
    resource: &str,
    stability: StabilityLevel,
    allowed: &[String],
    policy: EmptyAllowList,
) -> FamilyGenerator<K>
where
    K: Metadata<Ty = ObjectMeta> + 'static,
{
    let allowed: Arc<[String]> = allowed.into();
    FamilyGenerator::new(
        &format!("kube_{resource}_annotations"),
        ANNOTATIONS_HELP,
        MetricType::Gauge,
        stability,
        move |obj: &K| {
            projected(
                "annotation",
                obj.metadata().annotations.as_ref(),
                &allowed,
                policy,
            )
        },
    )
}

pub(crate) fn created_family<K>(resource: &str, stability: StabilityLevel) -> FamilyGenerator<K>
where
    K: Metadata<Ty = ObjectMeta> + 'static,
{
    FamilyGenerator::new(
        &format!("kube_{resource}_created"),
        CREATED_HELP,
        MetricType::Gauge,
        stability,
        |obj: &K| timestamp_metric(obj.metadata().creation_timestamp.as_ref()),
    )
}

pub(crate) fn deletion_family<K>(
    name: &str,
    stability: StabilityLevel,
) -> FamilyGenerator<K>
where
    K: Metadata<Ty = ObjectMeta> + 'static,
{
    FamilyGenerator::new(name, DELETED_HELP, MetricType::Gauge, stability, |obj: &K| {
        timestamp_metric(obj.metadata().deletion_timestamp.as_ref())
    })
}

/// `kube_<resource>_metadata_resource_version`.
pub(crate) fn resource_version_family<K>(
    resource: &str,
    help: &str,
    stability: StabilityLevel,
) -> FamilyGenerator<K>
where
    K: Metadata<Ty = ObjectMeta> + 'static,
{
    FamilyGenerator::new(
        &format!("kube_{resource}_metadata_resource_version"),
        help,
        MetricType::Gauge,
        stability,
        |obj: &K| kstate_core::state::resource_version_metric(obj.metadata().resource_version.as_deref()),
    )
}

/// A constant `1` without labels of its own.
pub(crate) fn info_family<K: 'static>(
    name: &str,
    help: &str,
    stability: StabilityLevel,
) -> FamilyGenerator<K> {
    FamilyGenerator::new(name, help, MetricType::Gauge, stability, |_: &K| {
        vec![Metric::value_only(1.0)]
    })
}

/// A single unlabeled sample computed from the object.
pub(crate) fn value_family<K, F>(
    name: &str,
    help: &str,
    stability: StabilityLevel,
    value: F,
) -> FamilyGenerator<K>
where
    K: 'static,
    F: Fn(&K) -> f64 + Send + Sync + 'static,
{
    FamilyGenerator::new(name, help, MetricType::Gauge, stability, move |obj: &K| {
        vec![Metric::value_only(value(obj))]
    })
}

/// One sample per owner reference; `placeholder` fills every label when there are none.
pub(crate) fn owner_metrics(owners: Option<&Vec<OwnerReference>>, placeholder: &str) -> Vec<Metric> {
    const KEYS: [&str; 3] = ["owner_kind", "owner_name", "owner_is_controller"];
    let owners = owners.map(Vec::as_slice).unwrap_or_default();
    if owners.is_empty() {
        return vec![Metric::with_labels(KEYS.map(|k| (k, placeholder)), 1.0)];
    }
    owners
        .iter()
        .map(|o| {
            let controller = o.controller.unwrap_or(false).to_string();
            Metric::with_labels(
                [
                    (KEYS[0], o.kind.clone()),
                    (KEYS[1], o.name.clone()),
                    (KEYS[2], controller),
                ],
                1.0,
            )
        })
        .collect()
}

/// The controller owner reference, if any.
pub(crate) fn controller_ref(owners: Option<&Vec<OwnerReference>>) -> Option<&OwnerReference> {
    owners?.iter().find(|o| o.controller == Some(true))
}

/// Optional integer field as a single sample, nothing when unset.
pub(crate) fn opt_value<T: Into<f64>>(v: Option<T>) -> Vec<Metric> {
    v.map(|v| vec![Metric::value_only(v.into())])
        .unwrap_or_default()
}

/// `i64` fields (generations, deadlines) as a single sample.
pub(crate) fn opt_i64(v: Option<i64>) -> Vec<Metric> {
    v.map(|v| vec![Metric::value_only(v as f64)])
        .unwrap_or_default()
}

/// Resource quantities as `{resource, unit}` samples, sorted by resource name.
///
/// `extra` labels are prepended to every sample. Unparseable quantities and
/// unknown resources are skipped.
pub(crate) fn resource_metrics(
    extra: &[(&str, &str)],
    resources: Option<&BTreeMap<String, Quantity>>,
) -> Vec<Metric> {
    let Some(resources) = resources else {
        return Vec::new();
    };
    resources
        .iter()
        .filter_map(|(name, q)| {
            let unit = ResourceUnit::of(name)?;
            let parsed = q.parsed().ok()?;
            let mut pairs: Vec<(String, String)> = extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            pairs.push(("resource".to_string(), sanitize_label_name(name)));
            pairs.push(("unit".to_string(), unit.as_str().to_string()));
            Some(Metric::with_labels(pairs, unit.value_of(&parsed)))
        })
        .collect()
}

/// Quantities keyed by their raw resource name, followed by the `extra` labels.
pub(crate) fn quantity_metrics(
    resources: Option<&BTreeMap<String, Quantity>>,
    extra: &[(&str, &str)],
) -> Vec<Metric> {
    let Some(resources) = resources else {
        return Vec::new();
    };
    resources
        .iter()
        .filter_map(|(name, q)| {
            let value = q.parsed().ok()?.as_cores();
            let pairs = std::iter::once(("resource", name.as_str())).chain(extra.iter().copied());
            Some(Metric::with_labels(pairs, value))
        })
        .collect()
}

pub(crate) fn requests(r: Option<&ResourceRequirements>) -> Option<&BTreeMap<String, Quantity>> {
    r.and_then(|r| r.requests.as_ref())
}

pub(crate) fn limits(r: Option<&ResourceRequirements>) -> Option<&BTreeMap<String, Quantity>> {
    r.and_then(|r| r.limits.as_ref())
}

/// Namespace and name of an object, in that order.
pub(crate) fn namespace_name<K: Metadata<Ty = ObjectMeta>>(obj: &K) -> Vec<String> {
    let meta = obj.metadata();
    vec![
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    ]
}

pub(crate) fn name<K: Metadata<Ty = ObjectMeta>>(obj: &K) -> Vec<String> {
    vec![obj.metadata().name.clone().unwrap_or_default()]
}
