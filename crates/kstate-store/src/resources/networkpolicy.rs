use k8s_openapi::api::networking::v1::NetworkPolicy;
use kstate_core::{FamilyGenerator, state::timestamp_metric, with_identity};
use kstate_model::{MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, labels_family, namespace_name, value_family,
};

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<NetworkPolicy>> {
    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_networkpolicy_created",
                "Unix creation timestamp of network policy",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |np: &NetworkPolicy| timestamp_metric(np.metadata.creation_timestamp.as_ref()),
            ),
            annotations_family(
                "networkpolicy",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "networkpolicy",
                StabilityLevel::Alpha,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            value_family(
                "kube_networkpolicy_spec_ingress_rules",
                "Number of ingress rules on the networkpolicy",
                StabilityLevel::Alpha,
                |np: &NetworkPolicy| {
                    np.spec.as_ref().and_then(|s| s.ingress.as_ref()).map_or(0, Vec::len) as f64
                },
            ),
            value_family(
                "kube_networkpolicy_spec_egress_rules",
                "Number of egress rules on the networkpolicy",
                StabilityLevel::Alpha,
                |np: &NetworkPolicy| {
                    np.spec.as_ref().and_then(|s| s.egress.as_ref()).map_or(0, Vec::len) as f64
                },
            ),
        ],
        &["namespace", "networkpolicy"],
        namespace_name,
    )
}
