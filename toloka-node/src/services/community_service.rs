//! Read side: platform totals, leaderboards, profiles and the badge catalog.

use std::sync::Arc;

use crate::db::{achievements, stats, teams, users, Database};
use crate::error::{Result, ServiceError};

pub struct CommunityService {
    db: Arc<Database>,
    leaderboard_limit: u32,
}

impl CommunityService {
    pub fn new(db: Arc<Database>, leaderboard_limit: u32) -> Self {
        Self {
            db,
            leaderboard_limit,
        }
    }

    pub fn platform_stats(&self) -> Result<stats::PlatformStats> {
        self.db.with_conn(stats::platform_stats)
    }

    pub fn leaderboard(&self) -> Result<Vec<users::LeaderboardEntry>> {
        let limit = self.leaderboard_limit;
        self.db.with_conn(|conn| users::leaderboard(conn, limit))
    }

    pub fn team_leaderboard(&self) -> Result<Vec<teams::TeamEntry>> {
        self.db.with_conn(teams::team_leaderboard)
    }

    pub fn profile(&self, username: &str) -> Result<users::UserProfile> {
        self.db
            .with_conn(|conn| users::profile(conn, username))?
            .ok_or_else(|| ServiceError::UserNotFound(username.to_string()))
    }

    pub fn catalog(&self) -> Result<Vec<achievements::CatalogEntry>> {
        self.db.with_conn(achievements::list)
    }
}
