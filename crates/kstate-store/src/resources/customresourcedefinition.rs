use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{AllowedKeys, EmptyAllowList, labels_family, name};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<CustomResourceDefinition>> {
    with_identity(
        vec![
            labels_family(
                "crd",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::IdentityOnly,
            ),
            FamilyGenerator::new(
                "kube_crd_info",
                "Info about crd.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |crd: &CustomResourceDefinition| {
                    vec![Metric::with_labels(
                        [
                            ("kind", crd.spec.names.kind.clone()),
                            ("scope", crd.spec.scope.clone()),
                        ],
                        1.0,
                    )]
                },
            ),
        ],
        &["customresourcedefinition"],
        name,
    )
}
