//! Statistics MCP Tools
//!
//! Thin wrappers over [`StatisticsEngine`] that turn "not found" into `None`.

use serde::Serialize;

use crate::db::Database;
use crate::stats::{CategoryStats, HabitStats, StatisticsEngine, StatsError, UserStats};
use crate::store::HabitStore;

/// Everything the statistics dashboard shows, in one response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsOverview {
    pub user_statistics: UserStats,
    pub category_statistics: Vec<CategoryStats>,
    pub habit_statistics: Vec<HabitStats>,
}

fn found<T>(result: Result<T, StatsError>, what: &str) -> Result<Option<T>, String> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            tracing::warn!("{}", e);
            Ok(None)
        }
        Err(e) => Err(format!("Failed to compute {} statistics: {}", what, e)),
    }
}

/// Streaks, completion rate and weekday distribution for one habit
pub fn get_habit_statistics(db: &Database, habit_id: i64, user_id: &str) -> Result<Option<HabitStats>, String> {
    found(StatisticsEngine::new(db).habit_stats(habit_id, user_id), "habit")
}

/// Roll-up over the habits in one category
pub fn get_category_statistics(
    db: &Database,
    category_id: i64,
    user_id: &str,
) -> Result<Option<CategoryStats>, String> {
    found(StatisticsEngine::new(db).category_stats(category_id, user_id), "category")
}

/// Roll-up over all of a user's habits and categories
pub fn get_user_statistics(db: &Database, user_id: &str) -> Result<UserStats, String> {
    StatisticsEngine::new(db)
        .user_stats(user_id)
        .map_err(|e| format!("Failed to compute user statistics: {}", e))
}

/// User roll-up plus the statistics of every category and habit
pub fn get_statistics_overview(db: &Database, user_id: &str) -> Result<StatisticsOverview, String> {
    let engine = StatisticsEngine::new(db);
    let err = |e: StatsError| format!("Failed to compute statistics overview: {}", e);

    let user_statistics = engine.user_stats(user_id).map_err(err)?;

    let habits = db.fetch_habits_by_user(user_id).map_err(|e| format!("Database error: {}", e))?;
    let habit_statistics = habits
        .iter()
        .map(|h| engine.habit_stats(h.id, user_id))
        .collect::<Result<Vec<_>, _>>()
        .map_err(err)?;

    let categories = db.fetch_categories_by_user(user_id).map_err(|e| format!("Database error: {}", e))?;
    let category_statistics = categories
        .iter()
        .map(|c| engine.category_stats(c.id, user_id))
        .collect::<Result<Vec<_>, _>>()
        .map_err(err)?;

    Ok(StatisticsOverview {
        user_statistics,
        category_statistics,
        habit_statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryCreate, Frequency, HabitCreate};
    use crate::tools::categories::create_category;
    use crate::tools::habits::{create_habit, log_progress};
    use crate::tools::test_support::setup;

    fn seed(db: &Database) -> (i64, i64, i64) {
        let health = create_category(db, CategoryCreate {
            user_id: "alice".to_string(),
            name: "Health".to_string(),
            color: None,
            icon: None,
        })
        .unwrap();
        let empty = create_category(db, CategoryCreate {
            user_id: "alice".to_string(),
            name: "Someday".to_string(),
            color: None,
            icon: None,
        })
        .unwrap();
        let exercise = create_habit(db, HabitCreate {
            user_id: "alice".to_string(),
            name: "Exercise".to_string(),
            description: String::new(),
            frequency: Frequency::Daily,
            category_id: Some(health.id),
            target_days: None,
            start_date: None,
            end_date: None,
            reminder: None,
        })
        .unwrap();

        // Mon T, Tue T, Wed F, Thu T, Fri T
        for (date, done) in [
            ("2025-03-03", true),
            ("2025-03-04", true),
            ("2025-03-05", false),
            ("2025-03-06", true),
            ("2025-03-07", true),
        ] {
            log_progress(db, exercise.id, "alice", Some(date), done, None).unwrap();
        }

        (exercise.id, health.id, empty.id)
    }

    #[test]
    fn test_habit_statistics_from_database() {
        let db = setup();
        let (habit_id, _, _) = seed(&db);

        let stats = get_habit_statistics(&db, habit_id, "alice").unwrap().unwrap();
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.days_tracked, 5);
        assert!((stats.completion_rate - 80.0).abs() < 0.001);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["completionsByDay"]["Monday"], 1);
        assert!(json["completionsByDay"].get("Wednesday").is_none());
    }

    #[test]
    fn test_not_found_becomes_none() {
        let db = setup();
        let (habit_id, category_id, _) = seed(&db);

        assert!(get_habit_statistics(&db, habit_id, "bob").unwrap().is_none());
        assert!(get_category_statistics(&db, category_id, "bob").unwrap().is_none());
    }

    #[test]
    fn test_empty_category_statistics() {
        let db = setup();
        let (_, _, empty_id) = seed(&db);

        let stats = get_category_statistics(&db, empty_id, "alice").unwrap().unwrap();
        assert_eq!(stats.total_habits, 0);
        assert_eq!(stats.average_completion_rate, 0.0);
    }

    #[test]
    fn test_user_statistics_omit_empty_categories() {
        let db = setup();
        seed(&db);

        let stats = get_user_statistics(&db, "alice").unwrap();
        assert_eq!(stats.total_categories, 2);
        assert!(stats.completion_rate_by_category.contains_key("Health"));
        assert!(!stats.completion_rate_by_category.contains_key("Someday"));
        assert!(stats.needs_attention_habits.is_empty());

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["completionRateByCategory"].get("Someday").is_none());
    }

    #[test]
    fn test_statistics_overview() {
        let db = setup();
        seed(&db);

        let overview = get_statistics_overview(&db, "alice").unwrap();
        assert_eq!(overview.habit_statistics.len(), 1);
        assert_eq!(overview.category_statistics.len(), 2);
        assert_eq!(overview.user_statistics.total_habits, 1);
    }
}
