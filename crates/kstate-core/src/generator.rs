use std::{fmt, sync::Arc};

use kstate_model::{Family, Metric, MetricType, StabilityLevel};

use crate::labels::merge_key_values;

type GenerateFn<K> = Arc<dyn Fn(&K) -> Vec<Metric> + Send + Sync>;

/// Every family of one object, rendered by a single call.
pub type ComposedFn<K> = Arc<dyn Fn(&K) -> Vec<Family> + Send + Sync>;

/// A named metric family definition for objects of type `K`.
///
/// The generate function only produces samples; the family name and type are
/// injected by [`FamilyGenerator::generate`].
pub struct FamilyGenerator<K> {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub stability: StabilityLevel,
    pub deprecated_version: Option<String>,
    pub opt_in: bool,
    generate: GenerateFn<K>,
}

impl<K> Clone for FamilyGenerator<K> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            help: self.help.clone(),
            metric_type: self.metric_type,
            stability: self.stability,
            deprecated_version: self.deprecated_version.clone(),
            opt_in: self.opt_in,
            generate: Arc::clone(&self.generate),
        }
    }
}

impl<K> fmt::Debug for FamilyGenerator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyGenerator")
            .field("name", &self.name)
            .field("metric_type", &self.metric_type)
            .field("stability", &self.stability)
            .field("opt_in", &self.opt_in)
            .finish_non_exhaustive()
    }
}

impl<K> FamilyGenerator<K> {
    pub fn new<F>(
        name: &str,
        help: &str,
        metric_type: MetricType,
        stability: StabilityLevel,
        generate: F,
    ) -> Self
    where
        F: Fn(&K) -> Vec<Metric> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            metric_type,
            stability,
            deprecated_version: None,
            opt_in: false,
            generate: Arc::new(generate),
        }
    }

    /// Mark the family deprecated; the help text is prefixed accordingly.
    pub fn deprecated(mut self, version: &str) -> Self {
        self.help = format!("(Deprecated since {version}) {}", self.help);
        self.deprecated_version = Some(version.to_string());
        self
    }

    /// Only exposed when explicitly listed in the opt-in filter.
    pub fn opt_in(mut self) -> Self {
        self.opt_in = true;
        self
    }

    pub fn generate(&self, obj: &K) -> Family {
        Family::new(self.name.clone(), self.metric_type, (self.generate)(obj))
    }

    /// `# HELP` and `# TYPE` lines, without a trailing newline.
    pub fn header(&self) -> String {
        let help = match self.stability {
            StabilityLevel::Stable => format!("[{}] {}", self.stability, self.help),
            _ => self.help.clone(),
        };
        format!(
            "# HELP {name} {help}\n# TYPE {name} {ty}",
            name = self.name,
            ty = self.metric_type
        )
    }
}

impl<K: 'static> FamilyGenerator<K> {
    fn map_metrics<F>(self, f: F) -> Self
    where
        F: Fn(&K, Vec<Metric>) -> Vec<Metric> + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.generate);
        Self {
            generate: Arc::new(move |obj: &K| f(obj, inner(obj))),
            ..self
        }
    }
}

/// Merge the resource's identity labels into every sample of every generator.
pub fn with_identity<K, F>(
    generators: Vec<FamilyGenerator<K>>,
    keys: &'static [&'static str],
    values: F,
) -> Vec<FamilyGenerator<K>>
where
    K: 'static,
    F: Fn(&K) -> Vec<String> + Send + Sync + 'static,
{
    let keys: Arc<[String]> = keys.iter().map(|k| k.to_string()).collect();
    let values = Arc::new(values);
    generators
        .into_iter()
        .map(|g| {
            let keys = Arc::clone(&keys);
            let values = Arc::clone(&values);
            g.map_metrics(move |obj, metrics| {
                let identity_values = values(obj);
                metrics
                    .into_iter()
                    .map(|m| {
                        let (label_keys, label_values) =
                            merge_key_values(&keys, &identity_values, m.label_keys, m.label_values);
                        Metric {
                            label_keys,
                            label_values,
                            value: m.value,
                        }
                    })
                    .collect()
            })
        })
        .collect()
}

/// One function rendering every family of an object, in declaration order.
pub fn compose_metric_gen_funcs<K: 'static>(generators: &[FamilyGenerator<K>]) -> ComposedFn<K> {
    let generators = generators.to_vec();
    Arc::new(move |obj: &K| generators.iter().map(|g| g.generate(obj)).collect())
}

pub fn extract_metric_family_headers<K>(generators: &[FamilyGenerator<K>]) -> Vec<String> {
    generators.iter().map(FamilyGenerator::header).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing {
        name: String,
        size: f64,
    }

    fn size_family() -> FamilyGenerator<Thing> {
        FamilyGenerator::new(
            "thing_size",
            "Size of a thing.",
            MetricType::Gauge,
            StabilityLevel::Stable,
            |t: &Thing| vec![Metric::value_only(t.size)],
        )
    }

    fn thing() -> Thing {
        Thing {
            name: "t1".to_string(),
            size: 3.0,
        }
    }

    #[test]
    fn generate_injects_name_and_type() {
        let family = size_family().generate(&thing());
        assert_eq!(family.name, "thing_size");
        assert_eq!(family.metric_type, MetricType::Gauge);
        assert_eq!(family.metrics, vec![Metric::value_only(3.0)]);
    }

    #[test]
    fn stable_header_carries_marker() {
        assert_eq!(
            size_family().header(),
            "# HELP thing_size [STABLE] Size of a thing.\n# TYPE thing_size gauge"
        );
    }

    #[test]
    fn alpha_header_has_no_marker() {
        let g = FamilyGenerator::new(
            "thing_total",
            "Things.",
            MetricType::Counter,
            StabilityLevel::Alpha,
            |_: &Thing| vec![],
        );
        assert_eq!(g.header(), "# HELP thing_total Things.\n# TYPE thing_total counter");
    }

    #[test]
    fn deprecated_prefixes_help() {
        let g = size_family().deprecated("v2.0.0");
        assert_eq!(g.help, "(Deprecated since v2.0.0) Size of a thing.");
        assert_eq!(g.deprecated_version.as_deref(), Some("v2.0.0"));
    }

    #[test]
    fn identity_labels_are_merged_first() {
        let labelled = FamilyGenerator::new(
            "thing_info",
            "Info.",
            MetricType::Gauge,
            StabilityLevel::Alpha,
            |_: &Thing| vec![Metric::with_labels([("kind", "box"), ("thing", "ignored")], 1.0)],
        );
        let gens = with_identity(vec![size_family(), labelled], &["thing"], |t: &Thing| {
            vec![t.name.clone()]
        });
        let families = compose_metric_gen_funcs(&gens)(&thing());

        assert_eq!(families[0].metrics[0].label_keys, vec!["thing"]);
        assert_eq!(families[0].metrics[0].label_values, vec!["t1"]);
        assert_eq!(families[1].metrics[0].label_keys, vec!["thing", "kind"]);
        assert_eq!(families[1].metrics[0].label_values, vec!["t1", "box"]);
    }

    #[test]
    fn headers_follow_declaration_order() {
        let gens = vec![size_family(), size_family().opt_in()];
        let headers = extract_metric_family_headers(&gens);
        assert_eq!(headers.len(), 2);
        assert!(gens[1].opt_in);
    }
}
