//! Habit and Progress MCP Tools
//!
//! Tools for managing habits and logging their daily completion.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

use super::{parse_date, parse_optional_date};
use crate::db::Database;
use crate::models::{
    Category, Habit, HabitCreate, HabitUpdate, ProgressLog, ProgressRecord, MAX_DESCRIPTION_LEN,
    MAX_NAME_LEN,
};

/// Response for list_habits and list_habits_by_category
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<Habit>,
    pub total: usize,
    pub active_count: usize,
}

impl From<Vec<Habit>> for ListHabitsResponse {
    fn from(habits: Vec<Habit>) -> Self {
        let total = habits.len();
        let active_count = habits.iter().filter(|h| !h.is_archived).count();
        Self {
            habits,
            total,
            active_count,
        }
    }
}

/// Response for delete_habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for log_progress
#[derive(Debug, Serialize)]
pub struct LogProgressResponse {
    pub id: i64,
    pub habit_id: i64,
    pub habit_name: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
}

/// Response for get_habit_progress
#[derive(Debug, Serialize)]
pub struct HabitProgressResponse {
    pub habit_id: i64,
    pub habit_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Vec<ProgressRecord>,
    pub completed_count: usize,
    pub total: usize,
}

fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Habit name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("Habit name cannot exceed {} characters", MAX_NAME_LEN));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LEN));
    }
    Ok(())
}

fn validate_target_days(target_days: Option<i32>) -> Result<(), String> {
    match target_days {
        Some(n) if n <= 0 => Err("target_days must be greater than 0".to_string()),
        _ => Ok(()),
    }
}

/// Normalize an optional ISO date field in place
fn normalize_date(field: &mut Option<String>) -> Result<(), String> {
    *field = parse_optional_date(field.as_deref())?.map(|d| d.to_string());
    Ok(())
}

/// Like [`normalize_date`] for an update field, where a blank value clears
/// the column
fn normalize_date_update(field: &mut Option<Option<String>>) -> Result<(), String> {
    if let Some(value) = field.as_mut() {
        normalize_date(value)?;
    }
    Ok(())
}

fn check_date_order(start: Option<&str>, end: Option<&str>) -> Result<(), String> {
    if let (Some(start), Some(end)) = (start, end) {
        // Both are normalized YYYY-MM-DD, so string order is date order
        if start > end {
            return Err(format!("start_date {} is after end_date {}", start, end));
        }
    }
    Ok(())
}

/// The category must exist and belong to the same user
fn check_category(conn: &Connection, category_id: i64, user_id: &str) -> Result<(), String> {
    let category = Category::get_by_id(conn, category_id, user_id)
        .map_err(|e| format!("Database error checking category: {}", e))?;
    if category.is_none() {
        return Err(format!("Category not found with id: {}", category_id));
    }
    Ok(())
}

// ============================================================================
// Habit Tools
// ============================================================================

/// Create a habit
pub fn create_habit(db: &Database, mut data: HabitCreate) -> Result<Habit, String> {
    validate_name(&data.name)?;
    validate_description(&data.description)?;
    data.name = data.name.trim().to_string();
    normalize_date(&mut data.start_date)?;
    normalize_date(&mut data.end_date)?;
    check_date_order(data.start_date.as_deref(), data.end_date.as_deref())?;
    validate_target_days(data.target_days)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if let Some(category_id) = data.category_id {
        check_category(&conn, category_id, &data.user_id)?;
    }

    let habit = Habit::create(&conn, &data).map_err(|e| format!("Failed to create habit: {}", e))?;
    tracing::info!(habit_id = habit.id, user_id = %habit.user_id, "created habit");
    Ok(habit)
}

/// Get a habit by ID
pub fn get_habit(db: &Database, id: i64, user_id: &str) -> Result<Option<Habit>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Habit::get_by_id(&conn, id, user_id).map_err(|e| format!("Failed to get habit: {}", e))
}

/// List a user's habits, newest first
pub fn list_habits(db: &Database, user_id: &str, include_archived: bool) -> Result<ListHabitsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut habits = Habit::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to list habits: {}", e))?;
    if !include_archived {
        habits.retain(|h| !h.is_archived);
    }

    Ok(habits.into())
}

/// List the habits filed under a category. `None` if the category doesn't exist.
pub fn list_habits_by_category(
    db: &Database,
    category_id: i64,
    user_id: &str,
) -> Result<Option<ListHabitsResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let category = Category::get_by_id(&conn, category_id, user_id)
        .map_err(|e| format!("Failed to get category: {}", e))?;
    if category.is_none() {
        return Ok(None);
    }

    let habits = Habit::list_for_category(&conn, category_id, user_id)
        .map_err(|e| format!("Failed to list habits: {}", e))?;

    Ok(Some(habits.into()))
}

/// Update a habit. Only fields that are set change.
pub fn update_habit(db: &Database, id: i64, user_id: &str, mut data: HabitUpdate) -> Result<Option<Habit>, String> {
    if let Some(ref name) = data.name {
        validate_name(name)?;
        data.name = Some(name.trim().to_string());
    }
    if let Some(ref description) = data.description {
        validate_description(description)?;
    }
    validate_target_days(data.target_days)?;
    normalize_date_update(&mut data.start_date)?;
    normalize_date_update(&mut data.end_date)?;
    if let Some(reminder) = data.reminder.as_mut() {
        *reminder = reminder.take().filter(|r| !r.trim().is_empty());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = match Habit::get_by_id(&conn, id, user_id).map_err(|e| format!("Database error: {}", e))? {
        Some(habit) => habit,
        None => return Ok(None),
    };

    let start_date = match data.start_date {
        Some(ref start) => start.as_deref(),
        None => existing.start_date.as_deref(),
    };
    let end_date = match data.end_date {
        Some(ref end) => end.as_deref(),
        None => existing.end_date.as_deref(),
    };
    check_date_order(start_date, end_date)?;
    if let Some(Some(category_id)) = data.category_id {
        check_category(&conn, category_id, user_id)?;
    }

    Habit::update(&conn, id, user_id, &data).map_err(|e| format!("Failed to update habit: {}", e))
}

/// Delete a habit along with its progress history
pub fn delete_habit(db: &Database, id: i64, user_id: &str) -> Result<DeleteHabitResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Habit::delete(&conn, id, user_id).map_err(|e| format!("Failed to delete habit: {}", e))?;
    if deleted {
        tracing::info!(habit_id = id, user_id, "deleted habit");
    }

    Ok(DeleteHabitResponse {
        success: deleted,
        deleted_id: id,
    })
}

// ============================================================================
// Progress Tools
// ============================================================================

/// Record whether a habit was done on a day (default today). Logging the
/// same day again replaces the earlier record.
pub fn log_progress(
    db: &Database,
    habit_id: i64,
    user_id: &str,
    date: Option<&str>,
    completed: bool,
    notes: Option<String>,
) -> Result<Option<LogProgressResponse>, String> {
    let date = parse_optional_date(date)?.unwrap_or_else(|| Utc::now().date_naive());

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let habit = match Habit::get_by_id(&conn, habit_id, user_id).map_err(|e| format!("Database error: {}", e))? {
        Some(habit) => habit,
        None => return Ok(None),
    };

    let record = ProgressRecord::upsert(&conn, &ProgressLog {
        habit_id,
        date,
        completed,
        notes,
    })
    .map_err(|e| format!("Failed to log progress: {}", e))?;

    Ok(Some(LogProgressResponse {
        id: record.id,
        habit_id,
        habit_name: habit.name,
        date: record.date,
        completed: record.completed,
        notes: record.notes,
    }))
}

/// A habit's progress records, oldest first, optionally within an inclusive range
pub fn get_habit_progress(
    db: &Database,
    habit_id: i64,
    user_id: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<Option<HabitProgressResponse>, String> {
    let start_date = parse_optional_date(start_date)?;
    let end_date = parse_optional_date(end_date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let habit = match Habit::get_by_id(&conn, habit_id, user_id).map_err(|e| format!("Database error: {}", e))? {
        Some(habit) => habit,
        None => return Ok(None),
    };

    let progress = ProgressRecord::list_for_habit(&conn, habit_id, start_date, end_date)
        .map_err(|e| format!("Failed to get progress: {}", e))?;
    let completed_count = progress.iter().filter(|r| r.completed).count();
    let total = progress.len();

    Ok(Some(HabitProgressResponse {
        habit_id,
        habit_name: habit.name,
        start_date,
        end_date,
        progress,
        completed_count,
        total,
    }))
}

/// Remove the record for one day. `None` if the habit doesn't exist.
pub fn delete_progress(db: &Database, habit_id: i64, user_id: &str, date: &str) -> Result<Option<bool>, String> {
    let date = parse_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Habit::get_by_id(&conn, habit_id, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Ok(None);
    }

    ProgressRecord::delete_for_date(&conn, habit_id, date)
        .map(Some)
        .map_err(|e| format!("Failed to delete progress: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryCreate, Frequency};
    use crate::tools::categories::create_category;
    use crate::tools::test_support::setup;

    fn new_habit(user_id: &str, name: &str) -> HabitCreate {
        HabitCreate {
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: String::new(),
            frequency: Frequency::Daily,
            category_id: None,
            target_days: None,
            start_date: None,
            end_date: None,
            reminder: None,
        }
    }

    #[test]
    fn test_create_habit_validation() {
        let db = setup();
        assert!(create_habit(&db, new_habit("alice", "")).is_err());
        assert!(create_habit(&db, new_habit("alice", &"x".repeat(101))).is_err());

        let mut bad_dates = new_habit("alice", "Run");
        bad_dates.start_date = Some("2025-04-01".to_string());
        bad_dates.end_date = Some("2025-03-01".to_string());
        assert!(create_habit(&db, bad_dates).is_err());

        let mut foreign_category = new_habit("bob", "Run");
        let category = create_category(&db, CategoryCreate {
            user_id: "alice".to_string(),
            name: "Health".to_string(),
            color: None,
            icon: None,
        })
        .unwrap();
        foreign_category.category_id = Some(category.id);
        assert!(create_habit(&db, foreign_category).is_err());
    }

    #[test]
    fn test_update_and_archive_habit() {
        let db = setup();
        let habit = create_habit(&db, new_habit("alice", "Run")).unwrap();

        let updated = update_habit(&db, habit.id, "alice", HabitUpdate {
            frequency: Some(Frequency::Weekly),
            is_archived: Some(true),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(updated.frequency, Frequency::Weekly);
        assert!(updated.is_archived);
        assert_eq!(updated.name, "Run");

        assert_eq!(list_habits(&db, "alice", false).unwrap().total, 0);
        let all = list_habits(&db, "alice", true).unwrap();
        assert_eq!(all.total, 1);
        assert_eq!(all.active_count, 0);

        assert!(update_habit(&db, habit.id, "bob", HabitUpdate::default()).unwrap().is_none());

        for bad in [0, -5] {
            let result = update_habit(&db, habit.id, "alice", HabitUpdate {
                target_days: Some(bad),
                ..Default::default()
            });
            assert!(result.is_err(), "target_days {} accepted", bad);
        }
        let unchanged = get_habit(&db, habit.id, "alice").unwrap().unwrap();
        assert_eq!(unchanged.target_days, None);
    }

    #[test]
    fn test_create_rejects_non_positive_target_days() {
        let db = setup();
        let mut habit = new_habit("alice", "Run");
        habit.target_days = Some(0);
        assert!(create_habit(&db, habit).is_err());
    }

    #[test]
    fn test_update_clears_dates_and_reminder() {
        let db = setup();
        let mut data = new_habit("alice", "Stretch");
        data.start_date = Some("2025-03-01".to_string());
        data.end_date = Some("2025-06-01".to_string());
        data.reminder = Some("08:00".to_string());
        let habit = create_habit(&db, data).unwrap();

        // Untouched fields stay
        let renamed = update_habit(&db, habit.id, "alice", HabitUpdate {
            name: Some("Stretch more".to_string()),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(renamed.start_date.as_deref(), Some("2025-03-01"));
        assert_eq!(renamed.reminder.as_deref(), Some("08:00"));

        let cleared = update_habit(&db, habit.id, "alice", HabitUpdate {
            start_date: Some(Some("  ".to_string())),
            end_date: Some(None),
            reminder: Some(Some(String::new())),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(cleared.start_date, None);
        assert_eq!(cleared.end_date, None);
        assert_eq!(cleared.reminder, None);

        // Clearing the end date lifts the ordering constraint against it
        let moved = update_habit(&db, habit.id, "alice", HabitUpdate {
            start_date: Some(Some("2025-09-01".to_string())),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(moved.start_date.as_deref(), Some("2025-09-01"));
    }

    #[test]
    fn test_log_progress_replaces_same_day() {
        let db = setup();
        let habit = create_habit(&db, new_habit("alice", "Read")).unwrap();

        log_progress(&db, habit.id, "alice", Some("2025-03-03"), false, None).unwrap();
        let logged = log_progress(&db, habit.id, "alice", Some("2025-03-03"), true, Some("late".into()))
            .unwrap()
            .unwrap();
        assert!(logged.completed);
        assert_eq!(logged.habit_name, "Read");

        let progress = get_habit_progress(&db, habit.id, "alice", None, None).unwrap().unwrap();
        assert_eq!(progress.total, 1);
        assert_eq!(progress.completed_count, 1);
        assert_eq!(progress.progress[0].notes.as_deref(), Some("late"));
    }

    #[test]
    fn test_progress_for_unknown_habit() {
        let db = setup();
        let habit = create_habit(&db, new_habit("alice", "Read")).unwrap();

        assert!(log_progress(&db, habit.id, "bob", None, true, None).unwrap().is_none());
        assert!(get_habit_progress(&db, 999, "alice", None, None).unwrap().is_none());
        assert!(log_progress(&db, habit.id, "alice", Some("yesterday"), true, None).is_err());
    }

    #[test]
    fn test_progress_range_and_delete() {
        let db = setup();
        let habit = create_habit(&db, new_habit("alice", "Read")).unwrap();
        for day in ["2025-03-01", "2025-03-02", "2025-03-03", "2025-03-04"] {
            log_progress(&db, habit.id, "alice", Some(day), true, None).unwrap();
        }

        let ranged = get_habit_progress(&db, habit.id, "alice", Some("2025-03-02"), Some("2025-03-03"))
            .unwrap()
            .unwrap();
        assert_eq!(ranged.total, 2);

        assert_eq!(delete_progress(&db, habit.id, "alice", "2025-03-02").unwrap(), Some(true));
        assert_eq!(delete_progress(&db, habit.id, "alice", "2025-03-02").unwrap(), Some(false));
        assert_eq!(get_habit_progress(&db, habit.id, "alice", None, None).unwrap().unwrap().total, 3);
    }

    #[test]
    fn test_list_habits_by_category() {
        let db = setup();
        let category = create_category(&db, CategoryCreate {
            user_id: "alice".to_string(),
            name: "Health".to_string(),
            color: None,
            icon: None,
        })
        .unwrap();
        let mut filed = new_habit("alice", "Run");
        filed.category_id = Some(category.id);
        create_habit(&db, filed).unwrap();
        create_habit(&db, new_habit("alice", "Read")).unwrap();

        let listed = list_habits_by_category(&db, category.id, "alice").unwrap().unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.habits[0].name, "Run");
        assert!(list_habits_by_category(&db, category.id, "bob").unwrap().is_none());
    }
}
