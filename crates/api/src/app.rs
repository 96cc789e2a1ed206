use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use persistence::db::RegionPools;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{audit, chat, health, operations};
use crate::services::{HttpIntentClassifier, IntentClassifier, OperationService};

#[derive(Clone)]
pub struct AppState {
    pub pools: Arc<RegionPools>,
    pub config: Arc<Config>,
    pub operations: OperationService,
    pub classifier: Option<Arc<dyn IntentClassifier>>,
}

pub fn create_app(config: Config, pools: RegionPools) -> Router {
    let config = Arc::new(config);
    let pools = Arc::new(pools);

    let classifier: Option<Arc<dyn IntentClassifier>> =
        HttpIntentClassifier::from_config(&config.classifier)
            .map(|c| Arc::new(c) as Arc<dyn IntentClassifier>);

    let state = AppState {
        pools: pools.clone(),
        config: config.clone(),
        operations: OperationService::new(pools),
        classifier,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Operation routes (v1). Authentication happens at the platform's
    // front door; callers arrive with the actor identity already resolved.
    let api_routes = Router::new()
        .route("/api/v1/chat", post(chat::post_message))
        .route("/api/v1/operations/preview", post(operations::preview))
        .route("/api/v1/operations/execute", post(operations::execute))
        .route("/api/v1/logs/query", post(operations::query))
        .route("/api/v1/audit", get(audit::list))
        .route("/api/v1/audit/:id", get(audit::get_by_id));

    // Public routes (probes and metrics)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
