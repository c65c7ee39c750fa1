//! Member Search Backend
//!
//! A REST backend over SQLite for members and teams, with dynamic search
//! filters and paginated results.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod search;

use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Search
        .route("/v1/members", get(api::search_members))
        .route("/v2/members", get(api::search_members_page_simple))
        .route("/v3/members", get(api::search_members_page_optimized))
        // Members
        .route("/members", get(api::list_members).post(api::create_member))
        .route("/members/summaries", get(api::list_member_summaries))
        .route("/members/{id}", get(api::get_member))
        .route("/members/{id}/team", put(api::change_member_team))
        // Teams
        .route("/teams", get(api::list_teams).post(api::create_team))
        .route("/teams/{id}/members", get(api::list_team_members));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
