use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio_util::sync::CancellationToken;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle })
    }

    /// `/metrics` in Prometheus exposition format, plus `/health`.
    pub fn router(&self) -> Router {
        router_for(self.handle.clone())
    }

    /// Serve the router on `addr` until `cancel` fires.
    pub async fn serve(&self, addr: &str, cancel: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding metrics listener on {addr}"))?;
        tracing::info!(%addr, "metrics endpoint listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .context("metrics server")
    }
}

pub fn router_for(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_and_metrics_respond() {
        // Local recorder, not installed globally.
        let recorder = PrometheusBuilder::new().build_recorder();
        let app = router_for(recorder.handle());
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("chat_pages_total").increment(2);
        });

        let rsp = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(rsp.status(), StatusCode::OK);

        let rsp = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(rsp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(rsp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("chat_pages_total 2"), "got: {text}");
    }
}
