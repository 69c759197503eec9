mod error;
pub use error::ApiError;

mod handler;
pub use handler::ScrapeHandler;

mod adapter;
pub use adapter::WriterAdapter;

mod http;
pub use http::{HttpApi, METRICS_CONTENT_TYPE};

pub use axum;
