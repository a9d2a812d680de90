//! Application startup and lifecycle management.

use crate::config::MenuConfig;
use crate::handlers::{self, health_check, metrics_handler, readiness_check, root};
use crate::services::providers::{GeminiConfig, GeminiTextProvider, TextProvider};
use crate::services::{init_metrics, AiService, Database};
use axum::{
    body::Body,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, spawn_purge_task, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: MenuConfig,
    pub db: Arc<Database>,
    pub ai: Arc<AiService>,
    pub ai_rate_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(config: MenuConfig, db: Database, provider: Arc<dyn TextProvider>) -> Self {
        let ai_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.ai_max_requests,
            config.rate_limit.ai_window_seconds,
        );

        Self {
            config,
            db: Arc::new(db),
            ai: Arc::new(AiService::new(provider)),
            ai_rate_limiter,
        }
    }
}

/// Build the HTTP router with every route and the shared middleware stack.
pub fn build_router(state: AppState) -> Router {
    // AI routes share one per-IP limiter
    let ai_routes = Router::new()
        .route(
            "/menu/ai/generate-description",
            post(handlers::ai::generate_description),
        )
        .route(
            "/menu/ai/estimate-calories",
            post(handlers::ai::estimate_calories),
        )
        .route("/menu/ai/estimate-price", post(handlers::ai::estimate_price))
        .layer(from_fn_with_state(
            state.ai_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(root::index))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .route("/debug/ip-info", get(root::ip_info))
        .route(
            "/menu",
            get(handlers::menu::list_menus).post(handlers::menu::create_menu),
        )
        .route("/menu/search", get(handlers::menu::search_menus))
        .route(
            "/menu/stats/category-counts",
            get(handlers::menu::category_counts),
        )
        .route("/menu/grouped", get(handlers::menu::grouped_menus))
        .route(
            "/menu/group-by-category",
            get(handlers::menu::group_by_category),
        )
        .route(
            "/menu/:id",
            get(handlers::menu::get_menu)
                .put(handlers::menu::update_menu)
                .delete(handlers::menu::delete_menu),
        )
        .merge(ai_routes)
        .fallback(root::not_found)
        .with_state(state)
        // Add metrics middleware
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Public API, any origin
        .layer(CorsLayer::permissive())
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the Gemini provider from configuration.
    pub async fn build(config: MenuConfig) -> Result<Self, AppError> {
        let gemini_config = GeminiConfig::new(&config.gemini.api_key, &config.gemini.model)
            .with_timeout(Duration::from_secs(config.gemini.timeout_seconds));
        let provider = GeminiTextProvider::new(gemini_config)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        tracing::info!(model = %config.gemini.model, "Initialized Gemini text provider");

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an explicit text provider.
    pub async fn build_with_provider(
        config: MenuConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        // Initialize metrics
        init_metrics();

        // Connect to database
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            e
        })?;

        // Bind HTTP listener (port 0 = random port for testing)
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState::new(config, db, provider);

        tracing::info!(
            port = port,
            ai_max_requests = state.config.rate_limit.ai_max_requests,
            ai_window_seconds = state.config.rate_limit.ai_window_seconds,
            "Menu service listening"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let purge_task = spawn_purge_task(self.state.ai_rate_limiter.clone());
        let router = build_router(self.state);

        let result = axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        purge_task.abort();

        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }
        result
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
