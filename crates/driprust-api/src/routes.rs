//! API routes

use axum::{
    routing::{get, post},
    Router,
};
use driprust_core::SmsTransport;
use driprust_storage::DatabasePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::handlers::{campaigns, health};
use crate::state::AppState;

/// Create the API router
pub fn create_router(
    db_pool: DatabasePool,
    transport: Arc<dyn SmsTransport>,
    send_delay: Duration,
) -> Router {
    let state = Arc::new(AppState {
        db_pool,
        transport,
        send_delay,
    });

    // Health check routes
    let health_routes = Router::new()
        .route("/", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .with_state(state.clone());

    // Campaign routes
    let campaign_routes = Router::new()
        .route("/", get(campaigns::list_campaigns))
        .route("/", post(campaigns::create_campaign))
        .route("/:campaign_id", get(campaigns::get_campaign))
        .route("/:campaign_id/messages", get(campaigns::list_campaign_messages))
        .route("/:campaign_id/pause", post(campaigns::pause_campaign))
        .route("/:campaign_id/resume", post(campaigns::resume_campaign))
        .route("/:campaign_id/send-batch", post(campaigns::send_batch));

    // API v1 routes
    let api_v1 = Router::new()
        .nest("/campaigns", campaign_routes)
        .with_state(state.clone());

    // Combine all routes
    Router::new()
        .nest("/health", health_routes)
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
}
