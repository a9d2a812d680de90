//! Prometheus metrics for menu-service.
//!
//! Covers database latency and every call made to the language model.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!("menu_db_query_duration_seconds", "Database query duration"),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// AI calls by operation and outcome
pub static AI_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "menu_ai_requests_total",
            "Total AI requests by operation and outcome"
        ),
        &["operation", "outcome"]
    )
    .expect("Failed to register AI_REQUESTS_TOTAL")
});

/// AI call latency
pub static AI_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "menu_ai_request_duration_seconds",
            "AI request duration",
            vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
        ),
        &["operation"]
    )
    .expect("Failed to register AI_REQUEST_DURATION")
});

/// Menus created, split by whether the model filled any field
pub static MENUS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("menu_created_total", "Total menus created"),
        &["ai_assisted"]
    )
    .expect("Failed to register MENUS_CREATED_TOTAL")
});

/// Register every metric up front so `/metrics` lists them before first use.
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&AI_REQUESTS_TOTAL);
    Lazy::force(&AI_REQUEST_DURATION);
    Lazy::force(&MENUS_CREATED_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record the outcome of one AI call.
pub fn record_ai_request(operation: &str, outcome: &str, duration_secs: f64) {
    AI_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    AI_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Record a created menu.
pub fn record_menu_created(ai_assisted: bool) {
    let label = if ai_assisted { "true" } else { "false" };
    MENUS_CREATED_TOTAL.with_label_values(&[label]).inc();
}
