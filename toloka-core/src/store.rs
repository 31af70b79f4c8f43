//! Collaborator contracts the evaluator reads from and writes to.
//!
//! Implementations decide how data is kept; the evaluator only requires that
//! everything done through one [`UnitOfWork`] commits together or not at all.

use crate::error::Result;
use crate::types::{AchievementDefinition, AchievementId, UserId, UserStatistics};

/// Read/write access to cumulative user statistics.
pub trait UserStore {
    fn get(&mut self, user_id: UserId) -> Result<UserStatistics>;
    fn update(&mut self, user_id: UserId, stats: &UserStatistics) -> Result<()>;
}

/// Read-only list of achievement definitions.
pub trait AchievementCatalog {
    fn list_all(&mut self) -> Result<Vec<AchievementDefinition>>;
}

/// Append-only record of granted achievements.
pub trait GrantLedger {
    fn has(&mut self, user_id: UserId, achievement_id: AchievementId) -> Result<bool>;
    fn add(&mut self, user_id: UserId, achievement_id: AchievementId) -> Result<()>;
}

/// The three contracts bundled behind one transactional handle.
pub trait UnitOfWork: UserStore + AchievementCatalog + GrantLedger {}

impl<T: UserStore + AchievementCatalog + GrantLedger> UnitOfWork for T {}

/// Something that can open a unit of work.
///
/// `transaction` must commit iff the closure returns `Ok` and must keep
/// concurrent callers from interleaving their read-modify-write cycles.
pub trait Repository {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>;
}
