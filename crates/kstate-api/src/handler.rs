use async_trait::async_trait;

use crate::error::ApiError;

/// Backend of the HTTP surface.
///
/// [`WriterAdapter`](crate::WriterAdapter) serves the exporter stores; tests and
/// embedders can plug in their own source.
#[async_trait]
pub trait ScrapeHandler: Send + Sync + 'static {
    /// Exposition text of every object metric.
    async fn render_metrics(&self) -> Result<String, ApiError>;

    /// Exposition text of the exporter's own metrics.
    async fn render_telemetry(&self) -> Result<String, ApiError>;

    /// Liveness of whatever the exporter depends on.
    async fn is_healthy(&self) -> bool {
        true
    }
}
