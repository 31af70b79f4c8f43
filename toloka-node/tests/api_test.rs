//! HTTP handler tests
//!
//! Handlers are called directly with extracted arguments; the router wiring
//! is covered by building it once.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use toloka_node::api::{create_router, routes, AppState, SharedState};
use toloka_node::db::events::{self, parse_event_date, EventStatus, JoinOutcome, NewEvent};
use toloka_node::db::teams::NewTeam;
use toloka_node::db::users::{self, NewUser};
use toloka_node::db::{achievements, Database};
use toloka_node::services::{CompletionRequest, CreateEventRequest, MembershipRequest};

fn state_with_event() -> (SharedState, i64, i64) {
    let db = Database::open_in_memory().unwrap();
    let (organizer, event_id) = db
        .write(|tx| {
            achievements::seed_defaults(tx)?;
            let organizer = users::create_user(tx, &NewUser::new("maria", "maria@toloka.ua"))?;
            let volunteer = users::create_user(tx, &NewUser::new("petro", "petro@toloka.ua"))?;
            let event_id = events::create_event(
                tx,
                &NewEvent {
                    title: "Прибирання лісу".to_string(),
                    description: None,
                    location: "Львів".to_string(),
                    latitude: None,
                    longitude: None,
                    date: parse_event_date("2026-09-20T10:00")?,
                    duration: None,
                    max_participants: Some(10),
                    creator_id: organizer,
                },
            )?;
            events::join_event(tx, event_id, volunteer)?;
            Ok((organizer, event_id))
        })
        .unwrap();

    (Arc::new(AppState::new(Arc::new(db), 50)), organizer, event_id)
}

#[tokio::test]
async fn test_health() {
    let response = routes::health().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_builds() {
    let (state, _, _) = state_with_event();
    let _router = create_router(state);
}

#[tokio::test]
async fn test_complete_event_handler() {
    let (state, organizer, event_id) = state_with_event();

    let Json(completion) = routes::complete_event(
        State(state.clone()),
        Path(event_id),
        Json(CompletionRequest {
            organizer_id: organizer,
            waste_collected: 12.0,
            area_cleaned: 5.0,
        }),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();

    assert_eq!(completion.event_id, event_id);
    assert_eq!(completion.report.points_awarded, 130);
    assert_eq!(completion.report.participant_count, 1);

    let Json(profile) = routes::profile(State(state), Path("petro".to_string()))
        .await
        .map_err(|e| e.status())
        .unwrap();
    assert_eq!(profile.stats.points, 130);
    assert_eq!(profile.achievements.len(), 2);
}

#[tokio::test]
async fn test_complete_event_errors_map_to_status() {
    let (state, organizer, event_id) = state_with_event();

    let forbidden = routes::complete_event(
        State(state.clone()),
        Path(event_id),
        Json(CompletionRequest {
            organizer_id: organizer + 1,
            waste_collected: 1.0,
            area_cleaned: 0.0,
        }),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let bad = routes::complete_event(
        State(state.clone()),
        Path(event_id),
        Json(CompletionRequest {
            organizer_id: organizer,
            waste_collected: -1.0,
            area_cleaned: 0.0,
        }),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let missing = routes::complete_event(
        State(state),
        Path(event_id + 100),
        Json(CompletionRequest {
            organizer_id: organizer,
            waste_collected: 1.0,
            area_cleaned: 0.0,
        }),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_profile_is_404() {
    let (state, _, _) = state_with_event();
    let err = routes::profile(State(state), Path("nobody".to_string()))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_and_stats() {
    let (state, _, _) = state_with_event();

    let Json(catalog) = routes::achievements(State(state.clone()))
        .await
        .map_err(|e| e.status())
        .unwrap();
    assert_eq!(catalog.len(), 6);

    let Json(stats) = routes::api_stats(State(state))
        .await
        .map_err(|e| e.status())
        .unwrap();
    assert_eq!(stats.total_events, 0);
    assert_eq!(stats.total_users, 2);
}

fn empty_state() -> SharedState {
    let db = Database::open_in_memory().unwrap();
    db.write(|tx| achievements::seed_defaults(tx)).unwrap();
    Arc::new(AppState::new(Arc::new(db), 50))
}

async fn register(state: &SharedState, username: &str) -> i64 {
    let (status, Json(created)) = routes::register_user(
        State(state.clone()),
        Json(NewUser::new(username, format!("{username}@toloka.ua"))),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    created.id
}

fn event_form(creator_id: i64, max_participants: Option<i64>) -> CreateEventRequest {
    CreateEventRequest {
        title: "Чистий берег".to_string(),
        description: None,
        location: "Дніпро".to_string(),
        latitude: None,
        longitude: None,
        date: "2026-08-15T09:30".to_string(),
        duration: Some(120),
        max_participants,
        creator_id,
    }
}

#[tokio::test]
async fn test_full_flow_through_handlers() {
    let state = empty_state();
    let organizer = register(&state, "organizer").await;
    let volunteer = register(&state, "volunteer").await;

    let (status, Json(event)) =
        routes::create_event(State(state.clone()), Json(event_form(organizer, None)))
            .await
            .map_err(|e| e.status())
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event.status, EventStatus::Planned);
    assert_eq!(event.date, "2026-08-15T09:30");

    let Json(joined) = routes::join_event(
        State(state.clone()),
        Path(event.id),
        Json(MembershipRequest { user_id: volunteer }),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();
    assert_eq!(joined.outcome, JoinOutcome::Joined);

    let Json(completion) = routes::complete_event(
        State(state.clone()),
        Path(event.id),
        Json(CompletionRequest {
            organizer_id: organizer,
            waste_collected: 3.0,
            area_cleaned: 0.0,
        }),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();
    assert_eq!(completion.report.participant_count, 1);

    let Json(profile) = routes::profile(State(state), Path("volunteer".to_string()))
        .await
        .map_err(|e| e.status())
        .unwrap();
    assert_eq!(profile.stats.points, 30);
    assert_eq!(profile.recent_events.len(), 1);
    assert_eq!(profile.recent_events[0].status, EventStatus::Completed);
}

#[tokio::test]
async fn test_join_full_event_and_leave() {
    let state = empty_state();
    let organizer = register(&state, "organizer").await;
    let first = register(&state, "first").await;
    let second = register(&state, "second").await;

    let (_, Json(event)) =
        routes::create_event(State(state.clone()), Json(event_form(organizer, Some(1))))
            .await
            .map_err(|e| e.status())
            .unwrap();

    let mut outcomes = Vec::new();
    for user_id in [first, second] {
        let Json(resp) = routes::join_event(
            State(state.clone()),
            Path(event.id),
            Json(MembershipRequest { user_id }),
        )
        .await
        .map_err(|e| e.status())
        .unwrap();
        outcomes.push(resp.outcome);
    }
    assert_eq!(outcomes, vec![JoinOutcome::Joined, JoinOutcome::Full]);

    let Json(left) = routes::leave_event(
        State(state.clone()),
        Path(event.id),
        Json(MembershipRequest { user_id: first }),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();
    assert!(left.left);

    let Json(retry) = routes::join_event(
        State(state),
        Path(event.id),
        Json(MembershipRequest { user_id: second }),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();
    assert_eq!(retry.outcome, JoinOutcome::Joined);
}

#[tokio::test]
async fn test_registration_and_event_form_errors() {
    let state = empty_state();
    let organizer = register(&state, "organizer").await;

    let dup = routes::register_user(
        State(state.clone()),
        Json(NewUser::new("organizer", "someone@toloka.ua")),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let mut bad_date = event_form(organizer, None);
    bad_date.date = "15.08.2026".to_string();
    let err = routes::create_event(State(state.clone()), Json(bad_date))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err = routes::create_event(State(state.clone()), Json(event_form(organizer + 50, None)))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err = routes::join_event(
        State(state),
        Path(1),
        Json(MembershipRequest { user_id: organizer + 50 }),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_teams_and_active_team_count() {
    let state = empty_state();
    let captain = register(&state, "captain").await;
    let member = register(&state, "member").await;

    let (status, Json(team)) = routes::create_team(
        State(state.clone()),
        Json(NewTeam {
            name: "Еко Патруль".to_string(),
            description: Some("Щосуботи біля річки".to_string()),
            captain_id: captain,
        }),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let Json(joined) = routes::join_team(
        State(state.clone()),
        Path(team.id),
        Json(MembershipRequest { user_id: member }),
    )
    .await
    .map_err(|e| e.status())
    .unwrap();
    assert!(joined.joined);

    let missing = routes::join_team(
        State(state.clone()),
        Path(team.id + 1),
        Json(MembershipRequest { user_id: member }),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let Json(board) = routes::teams(State(state.clone()))
        .await
        .map_err(|e| e.status())
        .unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].members, 2);
    assert_eq!(board[0].captain, "captain");

    let Json(stats) = routes::api_stats(State(state))
        .await
        .map_err(|e| e.status())
        .unwrap();
    assert_eq!(stats.active_teams, 1);
}
