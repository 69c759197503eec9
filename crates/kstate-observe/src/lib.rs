//! Process-wide logging setup for the exporter binaries.

mod logger;
pub use logger::*;
