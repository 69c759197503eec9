use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Request;
use kstate_core::MetricsWriter;
use kstate_prometheus::PrometheusMetrics;
use kube::Client;
use tracing::{debug, warn};

use crate::{error::ApiError, handler::ScrapeHandler};

const LIVEZ_PATH: &str = "/livez";

/// Serves the exporter stores and its self-metrics.
pub struct WriterAdapter {
    writer: MetricsWriter,
    telemetry: Arc<PrometheusMetrics>,
    liveness_client: Option<Client>,
}

impl WriterAdapter {
    pub fn new(writer: MetricsWriter, telemetry: Arc<PrometheusMetrics>) -> Self {
        Self {
            writer,
            telemetry,
            liveness_client: None,
        }
    }

    /// Report liveness through the API server's own `/livez`.
    pub fn with_liveness_client(mut self, client: Client) -> Self {
        self.liveness_client = Some(client);
        self
    }

    fn refresh_object_counts(&self) {
        for (resource, count) in self.writer.object_counts() {
            self.telemetry.set_objects(resource, count);
        }
    }
}

#[async_trait]
impl ScrapeHandler for WriterAdapter {
    async fn render_metrics(&self) -> Result<String, ApiError> {
        self.refresh_object_counts();
        let body = self.writer.write_all();
        debug!(bytes = body.len(), "metrics rendered");
        Ok(body)
    }

    async fn render_telemetry(&self) -> Result<String, ApiError> {
        self.refresh_object_counts();
        Ok(self.telemetry.encode()?)
    }

    async fn is_healthy(&self) -> bool {
        let Some(client) = &self.liveness_client else {
            return true;
        };
        let request = match Request::get(LIVEZ_PATH).body(Vec::new()) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "failed to build liveness request");
                return false;
            }
        };
        match client.request_text(request).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "api server liveness check failed");
                false
            }
        }
    }
}
