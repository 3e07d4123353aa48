use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{definitions, handlers, streams};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Broadcast definitions (admin surface)
        .route("/definitions", post(definitions::create_definition))
        .route("/definitions", get(definitions::list_definitions))
        .route("/definitions/{id}", get(definitions::get_definition))
        .route("/definitions/{id}", patch(definitions::update_definition))
        .route("/definitions/{id}", delete(definitions::delete_definition))
        // Running broadcasts
        .route("/streams/active", get(streams::list_active))
        .route("/streams/start", post(streams::start_all))
        .route("/streams/stop", post(streams::stop_all))
        .route(
            "/streams/nominations/{name}/start",
            post(streams::start_nomination),
        )
        .route(
            "/streams/nominations/{name}/stop",
            post(streams::stop_nomination),
        )
        .route("/streams/days/{day}/start", post(streams::start_day))
        .route("/streams/days/{day}/stop", post(streams::stop_day))
        .route(
            "/streams/platforms/{name}/start",
            post(streams::start_platform),
        )
        .route(
            "/streams/platforms/{name}/stop",
            post(streams::stop_platform),
        )
        // Single broadcasts
        .route("/broadcasts/{id}/start", post(streams::start_broadcast))
        .route("/broadcasts/{id}/stop", post(streams::stop_broadcast))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .layer(axum::middleware::from_fn(crate::metrics::track_requests))
        .layer(TraceLayer::new_for_http())
}
