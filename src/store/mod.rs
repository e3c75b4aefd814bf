//! Read access to habits, categories and their progress records.
//!
//! The statistics engine only ever reads through [`HabitStore`]; the SQLite
//! [`Database`](crate::db::Database) is the production implementation.

mod sqlite;

use chrono::NaiveDate;

use crate::db::DbResult;
use crate::models::{Category, Habit, ProgressRecord};

/// Read-only view of the habit data a statistics request needs.
///
/// Every lookup that takes a `user_id` only returns rows owned by that user.
pub trait HabitStore {
    fn fetch_habit(&self, id: i64, user_id: &str) -> DbResult<Option<Habit>>;

    fn fetch_habits_by_user(&self, user_id: &str) -> DbResult<Vec<Habit>>;

    fn fetch_habits_by_category(&self, category_id: i64, user_id: &str) -> DbResult<Vec<Habit>>;

    fn fetch_category(&self, id: i64, user_id: &str) -> DbResult<Option<Category>>;

    fn fetch_categories_by_user(&self, user_id: &str) -> DbResult<Vec<Category>>;

    /// Progress records for a habit, inclusive bounds. Callers must not rely on order.
    fn fetch_progress_in_range(
        &self,
        habit_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> DbResult<Vec<ProgressRecord>>;

    /// Full progress history for a habit
    fn fetch_progress_for_habit(&self, habit_id: i64) -> DbResult<Vec<ProgressRecord>> {
        self.fetch_progress_in_range(habit_id, None, None)
    }
}

impl<T: HabitStore + ?Sized> HabitStore for &T {
    fn fetch_habit(&self, id: i64, user_id: &str) -> DbResult<Option<Habit>> {
        (**self).fetch_habit(id, user_id)
    }

    fn fetch_habits_by_user(&self, user_id: &str) -> DbResult<Vec<Habit>> {
        (**self).fetch_habits_by_user(user_id)
    }

    fn fetch_habits_by_category(&self, category_id: i64, user_id: &str) -> DbResult<Vec<Habit>> {
        (**self).fetch_habits_by_category(category_id, user_id)
    }

    fn fetch_category(&self, id: i64, user_id: &str) -> DbResult<Option<Category>> {
        (**self).fetch_category(id, user_id)
    }

    fn fetch_categories_by_user(&self, user_id: &str) -> DbResult<Vec<Category>> {
        (**self).fetch_categories_by_user(user_id)
    }

    fn fetch_progress_in_range(
        &self,
        habit_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> DbResult<Vec<ProgressRecord>> {
        (**self).fetch_progress_in_range(habit_id, start_date, end_date)
    }
}
