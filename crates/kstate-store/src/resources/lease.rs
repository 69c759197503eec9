use k8s_openapi::api::coordination::v1::Lease;
use kstate_core::{FamilyGenerator, with_identity};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::name;

fn owner(l: &Lease) -> Vec<Metric> {
    let namespace = l.metadata.namespace.clone().unwrap_or_default();
    let holder = l
        .spec
        .as_ref()
        .and_then(|s| s.holder_identity.clone())
        .unwrap_or_default();
    let sample = |kind: &str, name: &str| {
        Metric::with_labels(
            [
                ("owner_kind", kind.to_string()),
                ("owner_name", name.to_string()),
                ("namespace", namespace.clone()),
                ("lease_holder", holder.clone()),
            ],
            1.0,
        )
    };
    match l.metadata.owner_references.as_deref() {
        None | Some([]) => vec![sample("", "")],
        Some(owners) => owners.iter().map(|o| sample(&o.kind, &o.name)).collect(),
    }
}

pub(crate) fn generators() -> Vec<FamilyGenerator<Lease>> {
    with_identity(
        vec![
            FamilyGenerator::new(
                "kube_lease_owner",
                "Information about the Lease's owner.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                owner,
            ),
            FamilyGenerator::new(
                "kube_lease_renew_time",
                "Kube lease renew time.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |l: &Lease| {
                    l.spec
                        .as_ref()
                        .and_then(|s| s.renew_time.as_ref())
                        .map(|t| vec![Metric::value_only(t.0.timestamp() as f64)])
                        .unwrap_or_default()
                },
            ),
        ],
        &["lease"],
        name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    #[test]
    fn owner_and_renew_time() {
        let lease: Lease = fixture(json!({
            "metadata": {
                "name": "kube-master",
                "namespace": "kube-node-lease",
                "ownerReferences": [{"apiVersion": "v1", "kind": "Node", "name": "kube-master", "uid": "u"}],
            },
            "spec": {"holderIdentity": "kube-master", "renewTime": "2017-09-20T10:06:40.000000Z"},
        }));
        let gens = generators();
        assert_eq!(
            samples(&gens, &lease, "kube_lease_owner"),
            vec!["kube_lease_owner{lease=\"kube-master\",owner_kind=\"Node\",owner_name=\"kube-master\",namespace=\"kube-node-lease\",lease_holder=\"kube-master\"} 1"]
        );
        assert_eq!(
            samples(&gens, &lease, "kube_lease_renew_time"),
            vec!["kube_lease_renew_time{lease=\"kube-master\"} 1.505902e+09"]
        );
    }

    #[test]
    fn lease_without_owner_or_spec() {
        let lease: Lease = fixture(json!({"metadata": {"name": "l", "namespace": "ns"}}));
        let gens = generators();
        assert_eq!(
            samples(&gens, &lease, "kube_lease_owner"),
            vec!["kube_lease_owner{lease=\"l\",owner_kind=\"\",owner_name=\"\",namespace=\"ns\",lease_holder=\"\"} 1"]
        );
        assert!(samples(&gens, &lease, "kube_lease_renew_time").is_empty());
    }
}
