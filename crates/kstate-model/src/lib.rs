//! Plain data types shared by every kstate crate.
//!
//! Nothing here talks to a cluster: these are the samples and families produced by
//! generators, their text rendering, and the parsed forms of user-facing flags.

mod error;
pub use error::ModelError;

mod metric;
pub use metric::{Metric, MetricType, StabilityLevel};

mod family;
pub use family::{Family, escape_label_value, format_value};

mod allow;
pub use allow::LabelsAllowList;

mod selection;
pub use selection::{ALL_NAMESPACES, NamespaceList, ResourceSet};
