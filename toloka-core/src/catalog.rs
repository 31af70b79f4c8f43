//! Built-in achievement catalog
//!
//! Stores seed these by name on startup; ids are assigned by the store.

use crate::types::{AchievementDefinition, AchievementId, ConditionType};

/// A catalog entry before it has been given an id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub condition_type: ConditionType,
    pub condition_value: f64,
}

impl AchievementSeed {
    pub fn with_id(&self, id: AchievementId) -> AchievementDefinition {
        AchievementDefinition {
            id,
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            condition_type: self.condition_type,
            condition_value: self.condition_value,
        }
    }
}

pub const DEFAULT_ACHIEVEMENTS: &[AchievementSeed] = &[
    AchievementSeed {
        name: "Перші кроки",
        description: "Участь у першій толоці",
        icon: "🌱",
        condition_type: ConditionType::EventsCount,
        condition_value: 1.0,
    },
    AchievementSeed {
        name: "Активіст",
        description: "Участь у 5 толоках",
        icon: "🌿",
        condition_type: ConditionType::EventsCount,
        condition_value: 5.0,
    },
    AchievementSeed {
        name: "Герой чистоти",
        description: "Участь у 20 толоках",
        icon: "🌳",
        condition_type: ConditionType::EventsCount,
        condition_value: 20.0,
    },
    AchievementSeed {
        name: "Збирач",
        description: "Зібрано 10 кг сміття",
        icon: "♻️",
        condition_type: ConditionType::WasteCollected,
        condition_value: 10.0,
    },
    AchievementSeed {
        name: "Еко-воїн",
        description: "Зібрано 100 кг сміття",
        icon: "🏆",
        condition_type: ConditionType::WasteCollected,
        condition_value: 100.0,
    },
    AchievementSeed {
        name: "Очищувач",
        description: "Очищено 100 м²",
        icon: "✨",
        condition_type: ConditionType::AreaCleaned,
        condition_value: 100.0,
    },
];

/// Default catalog with ids `1..=n` in declaration order.
pub fn default_definitions() -> Vec<AchievementDefinition> {
    DEFAULT_ACHIEVEMENTS
        .iter()
        .zip(1..)
        .map(|(seed, id)| seed.with_id(id))
        .collect()
}
