//! HTTP API
//!
//! Provides:
//! - Registration, event creation and sign-ups
//! - Event completion (points, statistics, achievements)
//! - Teams, platform totals and leaderboards
//! - User profiles and the achievement catalog

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::services::{CommunityService, CompletionService, ParticipationService};

/// State shared across handlers
pub struct AppState {
    pub participation: ParticipationService,
    pub completion: CompletionService,
    pub community: CommunityService,
}

impl AppState {
    pub fn new(db: Arc<Database>, leaderboard_limit: u32) -> Self {
        Self {
            participation: ParticipationService::new(db.clone()),
            completion: CompletionService::new(db.clone()),
            community: CommunityService::new(db, leaderboard_limit),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Create the API router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/users", post(routes::register_user))
        .route("/api/events", post(routes::create_event))
        .route("/api/events/:id/join", post(routes::join_event))
        .route("/api/events/:id/leave", post(routes::leave_event))
        .route("/api/events/:id/complete", post(routes::complete_event))
        .route("/api/teams", get(routes::teams).post(routes::create_team))
        .route("/api/teams/:id/join", post(routes::join_team))
        .route("/api/stats", get(routes::api_stats))
        .route("/api/leaderboard", get(routes::leaderboard))
        .route("/api/users/:username", get(routes::profile))
        .route("/api/achievements", get(routes::achievements))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
