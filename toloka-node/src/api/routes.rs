//! API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use super::{error::ApiError, SharedState};
use crate::db::events::{EventRow, JoinOutcome};
use crate::db::teams::{NewTeam, TeamEntry};
use crate::db::{achievements::CatalogEntry, stats::PlatformStats, users};
use crate::services::{CompletionRequest, CreateEventRequest, EventCompletion, MembershipRequest};

/// Id of a newly created row
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub outcome: JoinOutcome,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub left: bool,
}

#[derive(Debug, Serialize)]
pub struct TeamJoinResponse {
    pub joined: bool,
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// POST /api/users
pub async fn register_user(
    State(state): State<SharedState>,
    Json(user): Json<users::NewUser>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let id = state.participation.register_user(&user)?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<SharedState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventRow>), ApiError> {
    let event = state.participation.create_event(&req)?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/events/:id/join
pub async fn join_event(
    State(state): State<SharedState>,
    Path(event_id): Path<i64>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let outcome = state.participation.join_event(event_id, req.user_id)?;
    Ok(Json(JoinResponse { outcome }))
}

/// POST /api/events/:id/leave
pub async fn leave_event(
    State(state): State<SharedState>,
    Path(event_id): Path<i64>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<LeaveResponse>, ApiError> {
    let left = state.participation.leave_event(event_id, req.user_id)?;
    Ok(Json(LeaveResponse { left }))
}

/// POST /api/events/:id/complete
pub async fn complete_event(
    State(state): State<SharedState>,
    Path(event_id): Path<i64>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<EventCompletion>, ApiError> {
    Ok(Json(state.completion.complete_event(event_id, &req)?))
}

/// GET /api/stats
pub async fn api_stats(State(state): State<SharedState>) -> Result<Json<PlatformStats>, ApiError> {
    Ok(Json(state.community.platform_stats()?))
}

/// GET /api/teams
pub async fn teams(State(state): State<SharedState>) -> Result<Json<Vec<TeamEntry>>, ApiError> {
    Ok(Json(state.community.team_leaderboard()?))
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<SharedState>,
    Json(team): Json<NewTeam>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let id = state.participation.create_team(&team)?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// POST /api/teams/:id/join
pub async fn join_team(
    State(state): State<SharedState>,
    Path(team_id): Path<i64>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<TeamJoinResponse>, ApiError> {
    let joined = state.participation.join_team(team_id, req.user_id)?;
    Ok(Json(TeamJoinResponse { joined }))
}

/// GET /api/leaderboard
pub async fn leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<Vec<users::LeaderboardEntry>>, ApiError> {
    Ok(Json(state.community.leaderboard()?))
}

/// GET /api/users/:username
pub async fn profile(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<users::UserProfile>, ApiError> {
    Ok(Json(state.community.profile(&username)?))
}

/// GET /api/achievements
pub async fn achievements(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    Ok(Json(state.community.catalog()?))
}
