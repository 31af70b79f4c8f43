//! Point distribution and achievement evaluation for completed cleanup events
//!
//! When a toloka (community cleanup) is marked complete, each participant
//! receives the event's points, an equal share of its collected waste and
//! cleaned area, and any achievements whose thresholds their new totals cross.
//!
//! # Key Components
//!
//! - [`evaluate`]: pure rule evaluation over snapshots
//! - [`complete`]: loads, evaluates and writes back inside one transaction
//! - [`UserStore`], [`AchievementCatalog`], [`GrantLedger`]: collaborator contracts
//! - [`InMemoryRepository`]: transactional in-memory implementation
//!
//! # Example
//!
//! ```
//! use toloka_core::{complete, EventOutcome, InMemoryRepository, UserStatistics};
//!
//! let repo = InMemoryRepository::with_default_catalog();
//! repo.insert_user(1, UserStatistics::default()).unwrap();
//!
//! let report = complete(&repo, &EventOutcome::new(10.0, 0.0), &[1]).unwrap();
//! assert_eq!(report.participants[0].updated.points, 100);
//! ```

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod memory;
pub mod store;
pub mod types;

pub use catalog::{default_definitions, AchievementSeed, DEFAULT_ACHIEVEMENTS};
pub use error::{CompletionError, Result};
pub use evaluator::{complete, complete_in, evaluate};
pub use memory::{FailPoint, InMemoryRepository};
pub use store::{AchievementCatalog, GrantLedger, Repository, UnitOfWork, UserStore};
pub use types::*;
