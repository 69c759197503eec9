use k8s_openapi::api::core::v1::LimitRange;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{created_family, namespace_name, quantity_metrics};

fn constraints(lr: &LimitRange) -> Vec<Metric> {
    let Some(spec) = lr.spec.as_ref() else {
        return Vec::new();
    };
    let mut ms = Vec::new();
    for item in &spec.limits {
        let kind = item.type_.as_str();
        for (constraint, values) in [
            ("min", &item.min),
            ("max", &item.max),
            ("default", &item.default),
            ("defaultRequest", &item.default_request),
            ("maxLimitRequestRatio", &item.max_limit_request_ratio),
        ] {
            ms.extend(quantity_metrics(values.as_ref(), &[("type", kind), ("constraint", constraint)]));
        }
    }
    ms
}

pub(crate) fn generators() -> Vec<FamilyGenerator<LimitRange>> {
    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_limitrange",
                "Information about limit range.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                constraints,
            ),
            created_family("limitrange", StabilityLevel::Stable),
        ],
        &["namespace", "limitrange"],
        namespace_name,
    )
}
