//! Platform-wide totals shown on the landing page.

use rusqlite::Connection;
use serde::Serialize;

use super::teams;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformStats {
    pub total_events: i64,
    pub total_waste: f64,
    pub total_area: f64,
    pub total_users: i64,
    pub active_teams: i64,
}

pub fn platform_stats(conn: &Connection) -> Result<PlatformStats> {
    let total_events: i64 = conn.query_row(
        "SELECT COUNT(*) FROM events WHERE status = 'completed'",
        [],
        |row| row.get(0),
    )?;

    let (total_waste, total_area): (f64, f64) = conn.query_row(
        "SELECT COALESCE(SUM(waste_collected), 0.0), COALESCE(SUM(area_cleaned), 0.0)
         FROM events WHERE status = 'completed'",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let total_users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

    Ok(PlatformStats {
        total_events,
        total_waste,
        total_area,
        total_users,
        active_teams: teams::count(conn)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_empty_database() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.with_conn(|conn| platform_stats(conn)).unwrap();
        assert_eq!(stats, PlatformStats::default());
    }

    #[test]
    fn test_counts_teams() {
        use crate::db::teams::{create_team, NewTeam};
        use crate::db::users::{create_user, NewUser};

        let db = Database::open_in_memory().unwrap();
        db.write(|tx| {
            let captain = create_user(tx, &NewUser::new("lesia", "lesia@example.com"))?;
            for name in ["Дніпро", "Карпати"] {
                create_team(
                    tx,
                    &NewTeam {
                        name: name.to_string(),
                        description: None,
                        captain_id: captain,
                    },
                )?;
            }
            Ok(())
        })
        .unwrap();

        let stats = db.with_conn(platform_stats).unwrap();
        assert_eq!(stats.active_teams, 2);
        assert_eq!(stats.total_users, 1);
    }
}
