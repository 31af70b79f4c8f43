//! Completion service - the organizer's "event finished" action
//!
//! Enforces the caller-side policy the evaluator relies on (organizer only,
//! planned → completed exactly once) and runs the status change and the
//! participant credit in the same transaction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use toloka_core::{complete_in, CompletionReport, EventOutcome, UserId};

use crate::db::{events, Database, SqliteUnitOfWork};
use crate::error::{Result, ServiceError};

/// Organizer's completion form. Missing measurements count as zero.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    pub organizer_id: UserId,
    #[serde(default)]
    pub waste_collected: f64,
    #[serde(default)]
    pub area_cleaned: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventCompletion {
    pub event_id: i64,
    #[serde(flatten)]
    pub report: CompletionReport,
}

pub struct CompletionService {
    db: Arc<Database>,
}

impl CompletionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn complete_event(&self, event_id: i64, request: &CompletionRequest) -> Result<EventCompletion> {
        let outcome = EventOutcome::new(request.waste_collected, request.area_cleaned);
        outcome.validate()?;

        let report = self.db.write(|tx| {
            let event = events::get_event(tx, event_id)?.ok_or(ServiceError::EventNotFound(event_id))?;

            if event.creator_id != request.organizer_id {
                return Err(ServiceError::NotOrganizer {
                    event_id,
                    user_id: request.organizer_id,
                });
            }
            if event.status == events::EventStatus::Completed {
                return Err(ServiceError::AlreadyCompleted(event_id));
            }

            let participants = events::participant_ids(tx, event_id)?;
            events::mark_completed(tx, event_id, &outcome)?;

            let mut uow = SqliteUnitOfWork::new(tx);
            Ok(complete_in(&mut uow, &outcome, &participants)?)
        })?;

        info!(
            event_id,
            participants = report.participant_count,
            points_awarded = report.points_awarded,
            new_grants = report.total_new_grants(),
            "Event completed"
        );

        Ok(EventCompletion { event_id, report })
    }
}
