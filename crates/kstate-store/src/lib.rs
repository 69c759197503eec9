//! Metric family sets of every supported Kubernetes resource, and the wiring
//! that turns a configuration into stores fed by list/watch reflectors.

mod common;
mod reflector;
mod resources;

mod error;
pub use error::StoreError;

mod builder;
pub use builder::{Builder, Wiring};

pub use reflector::Reflector;
pub use resources::{AllowedKeys, catalog};
