use chrono::NaiveDate;

use super::HabitStore;
use crate::db::{Database, DbResult};
use crate::models::{Category, Habit, ProgressRecord};

impl HabitStore for Database {
    fn fetch_habit(&self, id: i64, user_id: &str) -> DbResult<Option<Habit>> {
        self.with_conn(|conn| Habit::get_by_id(conn, id, user_id))
    }

    fn fetch_habits_by_user(&self, user_id: &str) -> DbResult<Vec<Habit>> {
        self.with_conn(|conn| Habit::list_for_user(conn, user_id))
    }

    fn fetch_habits_by_category(&self, category_id: i64, user_id: &str) -> DbResult<Vec<Habit>> {
        self.with_conn(|conn| Habit::list_for_category(conn, category_id, user_id))
    }

    fn fetch_category(&self, id: i64, user_id: &str) -> DbResult<Option<Category>> {
        self.with_conn(|conn| Category::get_by_id(conn, id, user_id))
    }

    fn fetch_categories_by_user(&self, user_id: &str) -> DbResult<Vec<Category>> {
        self.with_conn(|conn| Category::list_for_user(conn, user_id))
    }

    fn fetch_progress_in_range(
        &self,
        habit_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> DbResult<Vec<ProgressRecord>> {
        self.with_conn(|conn| ProgressRecord::list_for_habit(conn, habit_id, start_date, end_date))
    }
}
