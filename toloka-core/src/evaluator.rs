//! Completion evaluator
//!
//! When an organizer marks an event complete, every participant is credited
//! with the event's points and an equal share of its measured impact, and the
//! achievement catalog is checked against the participant's fresh totals.
//!
//! [`evaluate`] is pure: it works on snapshots and returns a report.
//! [`complete_in`] loads those snapshots through a [`UnitOfWork`], evaluates,
//! and writes the result back through the same unit of work.
//! [`complete`] wraps that in a [`Repository`] transaction.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};

use crate::error::{CompletionError, Result};
use crate::store::{Repository, UnitOfWork};
use crate::types::{
    CatalogSnapshot, CompletionReport, EventOutcome, GrantedAchievement, ParticipantOutcome,
    ParticipantSnapshot, UserId, UserStatistics,
};

/// Decide the statistic updates and new grants for one completion.
pub fn evaluate(
    outcome: &EventOutcome,
    participants: &[ParticipantSnapshot],
    catalog: &CatalogSnapshot,
) -> Result<CompletionReport> {
    outcome.validate()?;
    ensure_distinct(participants.iter().map(|p| p.user_id))?;

    let points_awarded = outcome.points_awarded();
    let participant_count = participants.len();

    if participant_count == 0 {
        return Ok(CompletionReport {
            points_awarded,
            participant_count,
            participants: Vec::new(),
        });
    }

    let n = participant_count as f64;
    let waste_share = outcome.waste_collected / n;
    let area_share = outcome.area_cleaned / n;

    let participants = participants
        .iter()
        .map(|participant| {
            let previous = participant.stats;
            let updated = UserStatistics {
                points: previous.points.saturating_add(points_awarded),
                events_count: previous.events_count.saturating_add(1),
                total_waste: previous.total_waste + waste_share,
                total_area: previous.total_area + area_share,
            };

            // Thresholds are checked against the totals that include this event.
            let new_achievements = catalog
                .definitions()
                .iter()
                .filter(|def| !participant.granted.contains(&def.id))
                .filter(|def| def.is_met_by(&updated))
                .map(|def| GrantedAchievement {
                    id: def.id,
                    name: def.name.clone(),
                })
                .collect();

            ParticipantOutcome {
                user_id: participant.user_id,
                previous,
                updated,
                new_achievements,
            }
        })
        .collect();

    Ok(CompletionReport {
        points_awarded,
        participant_count,
        participants,
    })
}

/// Credit `participants` for `outcome` using an already-open unit of work.
///
/// Nothing is committed here; the caller owns the transaction boundary.
pub fn complete_in(
    uow: &mut dyn UnitOfWork,
    outcome: &EventOutcome,
    participants: &[UserId],
) -> Result<CompletionReport> {
    outcome.validate()?;
    ensure_distinct(participants.iter().copied())?;

    if participants.is_empty() {
        debug!("No participants, nothing to credit");
        return evaluate(outcome, &[], &CatalogSnapshot::default());
    }

    let catalog = CatalogSnapshot::new(uow.list_all()?);

    let mut snapshots = Vec::with_capacity(participants.len());
    for &user_id in participants {
        let stats = uow.get(user_id)?;
        let mut granted = BTreeSet::new();
        for def in catalog.definitions() {
            if uow.has(user_id, def.id)? {
                granted.insert(def.id);
            }
        }
        snapshots.push(ParticipantSnapshot {
            user_id,
            stats,
            granted,
        });
    }

    let report = evaluate(outcome, &snapshots, &catalog)?;

    for participant in &report.participants {
        uow.update(participant.user_id, &participant.updated)?;
        debug!(
            user_id = participant.user_id,
            points = participant.updated.points,
            events_count = participant.updated.events_count,
            "Updated participant statistics"
        );

        for achievement in &participant.new_achievements {
            uow.add(participant.user_id, achievement.id)?;
            info!(
                user_id = participant.user_id,
                achievement = %achievement.name,
                "Achievement granted"
            );
        }
    }

    Ok(report)
}

/// Credit `participants` for `outcome` as one all-or-nothing transaction.
pub fn complete<R: Repository>(
    repository: &R,
    outcome: &EventOutcome,
    participants: &[UserId],
) -> Result<CompletionReport> {
    let report = repository.transaction(|uow| complete_in(uow, outcome, participants))?;

    info!(
        participants = report.participant_count,
        points_awarded = report.points_awarded,
        new_grants = report.total_new_grants(),
        "Completion committed"
    );

    Ok(report)
}

fn ensure_distinct(ids: impl Iterator<Item = UserId>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CompletionError::InvalidInput(format!(
                "participant {id} listed more than once"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AchievementDefinition, ConditionType};

    fn def(id: i64, name: &str, condition_type: ConditionType, value: f64) -> AchievementDefinition {
        AchievementDefinition {
            id,
            name: name.to_string(),
            description: String::new(),
            icon: String::new(),
            condition_type,
            condition_value: value,
        }
    }

    fn fresh(user_id: UserId) -> ParticipantSnapshot {
        ParticipantSnapshot {
            user_id,
            stats: UserStatistics::default(),
            granted: BTreeSet::new(),
        }
    }

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            def(1, "Перші кроки", ConditionType::EventsCount, 1.0),
            def(2, "Збирач", ConditionType::WasteCollected, 10.0),
            def(3, "Очищувач", ConditionType::AreaCleaned, 100.0),
        ])
    }

    #[test]
    fn test_single_participant_crosses_two_thresholds() {
        let report = evaluate(&EventOutcome::new(10.0, 0.0), &[fresh(7)], &catalog()).unwrap();

        assert_eq!(report.points_awarded, 100);
        let p = &report.participants[0];
        assert_eq!(p.updated.points, 100);
        assert_eq!(p.updated.events_count, 1);
        assert_eq!(p.updated.total_waste, 10.0);
        assert_eq!(p.achievement_names(), vec!["Перші кроки", "Збирач"]);
    }

    #[test]
    fn test_points_not_split_but_impact_is() {
        let report = evaluate(
            &EventOutcome::new(5.0, 0.0),
            &[fresh(1), fresh(2)],
            &CatalogSnapshot::default(),
        )
        .unwrap();

        for p in &report.participants {
            assert_eq!(p.updated.points, 50);
            assert_eq!(p.updated.total_waste, 2.5);
            assert_eq!(p.updated.total_area, 0.0);
        }
    }

    #[test]
    fn test_already_granted_is_skipped() {
        let mut veteran = fresh(3);
        veteran.stats.events_count = 4;
        veteran.granted.insert(1);

        let report = evaluate(&EventOutcome::new(1.0, 0.0), &[veteran], &catalog()).unwrap();
        assert!(report.participants[0].new_achievements.is_empty());
        assert_eq!(report.participants[0].updated.events_count, 5);
    }

    #[test]
    fn test_threshold_uses_updated_totals() {
        let mut almost = fresh(4);
        almost.stats.total_area = 90.0;
        almost.granted.insert(1);

        let report = evaluate(&EventOutcome::new(0.0, 10.0), &[almost], &catalog()).unwrap();
        assert_eq!(report.participants[0].achievement_names(), vec!["Очищувач"]);
    }

    #[test]
    fn test_no_participants_is_noop() {
        let report = evaluate(&EventOutcome::new(50.0, 50.0), &[], &catalog()).unwrap();
        assert!(report.participants.is_empty());
        assert_eq!(report.participant_count, 0);
    }

    #[test]
    fn test_duplicate_participants_rejected() {
        let err = evaluate(&EventOutcome::new(1.0, 1.0), &[fresh(1), fresh(1)], &catalog())
            .unwrap_err();
        assert!(matches!(err, CompletionError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_input_rejected() {
        let err = evaluate(&EventOutcome::new(-1.0, 0.0), &[fresh(1)], &catalog()).unwrap_err();
        assert!(matches!(err, CompletionError::InvalidInput(_)));
    }
}
