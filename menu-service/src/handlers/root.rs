use axum::{
    extract::Request,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use service_core::middleware::rate_limit::{request_client_ip, CLIENT_IP_HEADERS};

/// Service banner.
///
/// GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Menu API Server Running",
        "service": "menu-service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "menu": "/menu",
            "ai": "/menu/ai",
            "debug": "/debug/ip-info",
            "health": "/health",
            "metrics": "/metrics"
        }
    }))
}

/// Show which client address the rate limiter would see.
///
/// GET /debug/ip-info
pub async fn ip_info(request: Request) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = CLIENT_IP_HEADERS
        .iter()
        .map(|name| {
            let value = request
                .headers()
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null);
            (name.to_string(), value)
        })
        .collect();

    Json(json!({
        "detected_ip": request_client_ip(&request),
        "headers": headers,
    }))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Endpoint tidak ditemukan",
            "requested_url": uri.to_string(),
        })),
    )
}
