use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::get,
};

use crate::{error::ApiError, handler::ScrapeHandler};

/// Prometheus text exposition format, version 0.0.4.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const METRICS_PATH: &str = "/metrics";
const HEALTHZ_PATH: &str = "/healthz";
const LIVEZ_PATH: &str = "/livez";

/// HTTP surface builder over a [`ScrapeHandler`].
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> Clone for HttpApi<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H> HttpApi<H>
where
    H: ScrapeHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Object metrics listener.
    ///
    /// Routes:
    /// - GET /metrics - object metrics
    /// - GET /healthz - process health
    /// - GET /livez - API server liveness
    /// - GET / - landing page
    pub fn router(&self) -> Router {
        Router::new()
            .route(METRICS_PATH, get(metrics::<H>))
            .route(HEALTHZ_PATH, get(healthz))
            .route(LIVEZ_PATH, get(livez::<H>))
            .route("/", get(index))
            .with_state(Arc::clone(&self.handler))
    }

    /// Self-metrics listener.
    pub fn telemetry_router(&self) -> Router {
        Router::new()
            .route(METRICS_PATH, get(telemetry::<H>))
            .route("/", get(telemetry_index))
            .with_state(Arc::clone(&self.handler))
    }
}

fn exposition(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body)
}

async fn metrics<H: ScrapeHandler>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError> {
    Ok(exposition(handler.render_metrics().await?))
}

async fn telemetry<H: ScrapeHandler>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError> {
    Ok(exposition(handler.render_telemetry().await?))
}

async fn healthz() -> &'static str {
    "OK"
}

async fn livez<H: ScrapeHandler>(State(handler): State<Arc<H>>) -> impl IntoResponse {
    if handler.is_healthy().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
    }
}

fn landing(description: &str, links: &[(&str, &str)]) -> Html<String> {
    let items: String = links
        .iter()
        .map(|(href, text)| format!("<li><a href='{href}'>{text}</a></li>"))
        .collect();
    Html(format!(
        "<html><head><title>kube-state-metrics</title></head>\
         <body><h1>kube-state-metrics</h1><p>{description}</p><ul>{items}</ul></body></html>"
    ))
}

async fn index() -> Html<String> {
    landing(
        "Metrics for Kubernetes' state",
        &[(METRICS_PATH, "Metrics"), (HEALTHZ_PATH, "Healthz"), (LIVEZ_PATH, "Livez")],
    )
}

async fn telemetry_index() -> Html<String> {
    landing("Self-metrics for kube-state-metrics", &[(METRICS_PATH, "Metrics")])
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use tower::ServiceExt;

    use super::*;

    struct Stub {
        healthy: bool,
        fail: bool,
    }

    #[async_trait]
    impl ScrapeHandler for Stub {
        async fn render_metrics(&self) -> Result<String, ApiError> {
            if self.fail {
                return Err(ApiError::Internal("store poisoned".to_string()));
            }
            Ok("kube_pod_info{pod=\"p1\"} 1\n".to_string())
        }

        async fn render_telemetry(&self) -> Result<String, ApiError> {
            Ok("kube_state_metrics_build_info{version=\"test\"} 1\n".to_string())
        }

        async fn is_healthy(&self) -> bool {
            self.healthy
        }
    }

    fn api(healthy: bool, fail: bool) -> HttpApi<Stub> {
        HttpApi::new(Arc::new(Stub { healthy, fail }))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn metrics_use_text_exposition_format() {
        let (status, content_type, body) = get(api(true, false).router(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(METRICS_CONTENT_TYPE));
        assert_eq!(body, "kube_pod_info{pod=\"p1\"} 1\n");
    }

    #[tokio::test]
    async fn failed_render_becomes_json_error() {
        let (status, _, body) = get(api(true, true).router(), "/metrics").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "internal error: store poisoned");
        assert_eq!(json["code"], 500);
    }

    #[tokio::test]
    async fn health_endpoints() {
        let (status, _, body) = get(api(false, false).router(), "/healthz").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));

        let (status, _, _) = get(api(false, false).router(), "/livez").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _, _) = get(api(true, false).router(), "/livez").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn index_links_endpoints() {
        let (status, _, body) = get(api(true, false).router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<a href='/metrics'>Metrics</a>"));
        assert!(body.contains("<a href='/livez'>Livez</a>"));
    }

    #[tokio::test]
    async fn telemetry_router_serves_self_metrics() {
        let (status, content_type, body) = get(api(true, false).telemetry_router(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(METRICS_CONTENT_TYPE));
        assert!(body.contains("kube_state_metrics_build_info"));

        let (status, _, _) = get(api(true, false).telemetry_router(), "/healthz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
