//! Metric family engine: label projection, identity merge, enum-state helpers,
//! typed family generators, filters, allow-list resolution and the rendered
//! metrics store.

mod error;
pub use error::CoreError;

pub mod labels;
pub use labels::{create_prometheus_label_keys_values, merge_key_values};

pub mod state;
pub use state::EmptyPolicy;

pub mod quantity;
pub use quantity::{ParsedQuantity, QuantityExt, ResourceUnit};

mod generator;
pub use generator::{
    ComposedFn, FamilyGenerator, compose_metric_gen_funcs, extract_metric_family_headers, with_identity,
};

mod filter;
pub use filter::{
    AllowDenyList, CompositeFamilyGeneratorFilter, FamilyGeneratorFilter, OptInFilter,
    filter_generators,
};

mod allow;
pub use allow::{
    AllowList, ResourceCatalog, WILDCARD, resolve_allow_list, resolve_enabled_resources,
};

mod selector;
pub use selector::{exclude_namespaces_selector, merge_field_selectors};

mod store;
pub use store::{MetricsSink, MetricsStore, ObjectKey};

mod writer;
pub use writer::{MetricsWriter, MultiStoreWriter};

mod telemetry;
pub use telemetry::{NoopMetrics, WatchMetrics, WatchOutcome};
