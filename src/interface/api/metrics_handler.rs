//! Prometheus metrics endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tower_http::trace::TraceLayer;
use tracing::warn;

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process and return its handle
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                warn!(error = %e, "metrics recorder already installed");
            }
            describe_metrics();
            handle
        })
        .clone()
}

fn describe_metrics() {
    describe_counter!(
        "sip_dispatch_total",
        "Dispatch decisions made for inbound calls, by result"
    );
    describe_counter!(
        "sip_dispatch_errors_total",
        "Dispatch evaluations that failed closed, by kind"
    );
    describe_counter!(
        "sip_trunk_auth_total",
        "Trunk credential lookups, by outcome"
    );
    describe_gauge!(
        "sip_drain_active_calls",
        "Active calls observed by the last drain poll"
    );
}

/// Router serving `/metrics` from the given handle
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(handle)
}

async fn metrics_handler(State(handle): State<PrometheusHandle>) -> Response {
    (StatusCode::OK, handle.render()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_metrics_endpoint_renders() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("sip_dispatch_total", "result" => "accept").increment(2);
        });

        let response = metrics_router(handle)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("sip_dispatch_total"));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let response = metrics_router(handle)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
