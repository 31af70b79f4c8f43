//! Domain types shared by the evaluator, the stores and the API layer.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

pub type UserId = i64;
pub type AchievementId = i64;

/// Measured impact of a finished cleanup event.
///
/// Filled in once by the organizer when the event is marked complete.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventOutcome {
    /// Kilograms of waste collected
    pub waste_collected: f64,
    /// Square metres cleaned
    pub area_cleaned: f64,
}

impl EventOutcome {
    pub fn new(waste_collected: f64, area_cleaned: f64) -> Self {
        Self {
            waste_collected,
            area_cleaned,
        }
    }

    /// Reject negative or non-finite measurements, and outcomes worth more
    /// points than a signed 64-bit counter can hold.
    pub fn validate(&self) -> Result<(), CompletionError> {
        check_measurement("waste_collected", self.waste_collected)?;
        check_measurement("area_cleaned", self.area_cleaned)?;

        let raw = self.raw_points();
        if raw >= MAX_POINTS_PER_EVENT {
            return Err(CompletionError::InvalidInput(format!(
                "outcome is worth too many points ({raw:e})"
            )));
        }
        Ok(())
    }

    /// Points credited to every participant: `floor(waste * 10 + area * 2)`.
    ///
    /// Not divided by the participant count.
    pub fn points_awarded(&self) -> u64 {
        self.raw_points().floor() as u64
    }

    fn raw_points(&self) -> f64 {
        self.waste_collected * WASTE_POINTS_PER_KG + self.area_cleaned * AREA_POINTS_PER_M2
    }
}

pub const WASTE_POINTS_PER_KG: f64 = 10.0;
pub const AREA_POINTS_PER_M2: f64 = 2.0;

/// 2^63: the first value that no longer fits an `i64` points column.
const MAX_POINTS_PER_EVENT: f64 = i64::MAX as f64;

fn check_measurement(field: &str, value: f64) -> Result<(), CompletionError> {
    if !value.is_finite() {
        return Err(CompletionError::InvalidInput(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(CompletionError::InvalidInput(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    Ok(())
}

/// Cumulative per-user counters. Never decreased.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStatistics {
    pub points: u64,
    pub events_count: u64,
    pub total_waste: f64,
    pub total_area: f64,
}

impl UserStatistics {
    /// Current value of the metric an achievement condition refers to.
    pub fn metric(&self, condition: ConditionType) -> f64 {
        match condition {
            ConditionType::EventsCount => self.events_count as f64,
            ConditionType::WasteCollected => self.total_waste,
            ConditionType::AreaCleaned => self.total_area,
        }
    }
}

/// Which cumulative metric an achievement threshold is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    EventsCount,
    WasteCollected,
    AreaCleaned,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::EventsCount => "events_count",
            ConditionType::WasteCollected => "waste_collected",
            ConditionType::AreaCleaned => "area_cleaned",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "events_count" => Ok(ConditionType::EventsCount),
            "waste_collected" => Ok(ConditionType::WasteCollected),
            "area_cleaned" => Ok(ConditionType::AreaCleaned),
            other => Err(format!("unknown condition type: {other}")),
        }
    }
}

/// A catalog entry: a named badge and the threshold that unlocks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition_type: ConditionType,
    pub condition_value: f64,
}

impl AchievementDefinition {
    pub fn is_met_by(&self, stats: &UserStatistics) -> bool {
        stats.metric(self.condition_type) >= self.condition_value
    }
}

/// Immutable view of every achievement definition, loaded once per completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    definitions: Vec<AchievementDefinition>,
}

impl CatalogSnapshot {
    pub fn new(definitions: Vec<AchievementDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// A participant as the evaluator sees them before the event is credited.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSnapshot {
    pub user_id: UserId,
    pub stats: UserStatistics,
    /// Achievements already present in the grant ledger
    pub granted: BTreeSet<AchievementId>,
}

/// Reference to a newly granted achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedAchievement {
    pub id: AchievementId,
    pub name: String,
}

/// What the evaluator decided for one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantOutcome {
    pub user_id: UserId,
    pub previous: UserStatistics,
    pub updated: UserStatistics,
    pub new_achievements: Vec<GrantedAchievement>,
}

impl ParticipantOutcome {
    pub fn achievement_names(&self) -> Vec<&str> {
        self.new_achievements.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Result of evaluating (and, once committed, applying) one completion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionReport {
    pub points_awarded: u64,
    pub participant_count: usize,
    pub participants: Vec<ParticipantOutcome>,
}

impl CompletionReport {
    pub fn total_new_grants(&self) -> usize {
        self.participants
            .iter()
            .map(|p| p.new_achievements.len())
            .sum()
    }
}
