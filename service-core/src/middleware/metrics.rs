use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, HistogramVec,
    IntCounterVec,
};
use std::time::Instant;

/// HTTP requests by method, route template and status.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL")
});

/// HTTP latency by method, route template and status.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!("http_request_duration_seconds", "HTTP request duration"),
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION")
});

/// Record request count and latency, labelled by route template rather than raw URI.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();
    let labels = [method.as_str(), path.as_str(), status.as_str()];

    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(duration.as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_labels_use_route_template() {
        let app = Router::new()
            .route("/items/:id", get(|| async { "ok" }))
            .layer(from_fn(metrics_middleware));

        let before = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/items/:id", "200"])
            .get();

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/items/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let after = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/items/:id", "200"])
            .get();
        assert_eq!(after, before + 1);
    }
}
