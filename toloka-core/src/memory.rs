//! In-memory repository
//!
//! A whole-state copy-on-write store: each transaction works on a clone of the
//! state under a global mutex and swaps it in only on success. Used by tests
//! and by anything that needs the evaluator without a database.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::catalog::default_definitions;
use crate::error::{CompletionError, Result};
use crate::store::{AchievementCatalog, GrantLedger, Repository, UnitOfWork, UserStore};
use crate::types::{AchievementDefinition, AchievementId, UserId, UserStatistics};

/// Write that should fail, for exercising rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Update(UserId),
    Grant(UserId, AchievementId),
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserStatistics>,
    achievements: Vec<AchievementDefinition>,
    grants: BTreeSet<(UserId, AchievementId)>,
    fail_point: Option<FailPoint>,
}

impl UserStore for MemoryState {
    fn get(&mut self, user_id: UserId) -> Result<UserStatistics> {
        self.users
            .get(&user_id)
            .copied()
            .ok_or(CompletionError::UserNotFound(user_id))
    }

    fn update(&mut self, user_id: UserId, stats: &UserStatistics) -> Result<()> {
        if self.fail_point == Some(FailPoint::Update(user_id)) {
            return Err(CompletionError::persistence(format!(
                "update of user {user_id} rejected"
            )));
        }
        match self.users.get_mut(&user_id) {
            Some(current) => {
                *current = *stats;
                Ok(())
            }
            None => Err(CompletionError::UserNotFound(user_id)),
        }
    }
}

impl AchievementCatalog for MemoryState {
    fn list_all(&mut self) -> Result<Vec<AchievementDefinition>> {
        Ok(self.achievements.clone())
    }
}

impl GrantLedger for MemoryState {
    fn has(&mut self, user_id: UserId, achievement_id: AchievementId) -> Result<bool> {
        Ok(self.grants.contains(&(user_id, achievement_id)))
    }

    fn add(&mut self, user_id: UserId, achievement_id: AchievementId) -> Result<()> {
        if self.fail_point == Some(FailPoint::Grant(user_id, achievement_id)) {
            return Err(CompletionError::persistence(format!(
                "grant of achievement {achievement_id} to user {user_id} rejected"
            )));
        }
        if !self.grants.insert((user_id, achievement_id)) {
            return Err(CompletionError::persistence(format!(
                "achievement {achievement_id} already granted to user {user_id}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryRepository {
    pub fn new(achievements: Vec<AchievementDefinition>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                achievements,
                ..Default::default()
            }),
        }
    }

    /// Repository seeded with the built-in catalog.
    pub fn with_default_catalog() -> Self {
        Self::new(default_definitions())
    }

    pub fn insert_user(&self, user_id: UserId, stats: UserStatistics) -> Result<()> {
        let mut state = self.lock()?;
        state.users.insert(user_id, stats);
        Ok(())
    }

    pub fn stats(&self, user_id: UserId) -> Result<UserStatistics> {
        self.lock()?.get(user_id)
    }

    pub fn granted(&self, user_id: UserId) -> Result<Vec<AchievementId>> {
        let state = self.lock()?;
        Ok(state
            .grants
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, aid)| *aid)
            .collect())
    }

    pub fn set_fail_point(&self, fail_point: Option<FailPoint>) -> Result<()> {
        self.lock()?.fail_point = fail_point;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| CompletionError::persistence(format!("lock poisoned: {e}")))
    }
}

impl Repository for InMemoryRepository {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>,
    {
        let mut state = self.lock()?;
        let mut staged = state.clone();
        let value = f(&mut staged)?;
        *state = staged;
        Ok(value)
    }
}
