//! Habit model
//!
//! A recurring activity a user wants to track, optionally filed under a category.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// How often a habit is meant to be performed.
///
/// Only a classification tag; nothing is scheduled from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Some(Frequency::Daily),
            "weekly" | "week" | "w" => Some(Frequency::Weekly),
            "monthly" | "month" | "m" => Some(Frequency::Monthly),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }

    /// Position in [`Frequency::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Frequency::Daily => 0,
            Frequency::Weekly => 1,
            Frequency::Monthly => 2,
        }
    }
}

/// A habit record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
    pub category_id: Option<i64>,
    pub is_archived: bool,
    pub target_days: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reminder: Option<String>,
    pub created_at: String,
}

/// Data for creating a habit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitCreate {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
    pub category_id: Option<i64>,
    pub target_days: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reminder: Option<String>,
}

/// Data for updating a habit. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    /// `Some(None)` moves the habit out of its category
    pub category_id: Option<Option<i64>>,
    pub is_archived: Option<bool>,
    pub target_days: Option<i32>,
    /// For these three, `Some(None)` clears the column
    pub start_date: Option<Option<String>>,
    pub end_date: Option<Option<String>>,
    pub reminder: Option<Option<String>>,
}

impl HabitUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.frequency.is_none()
            && self.category_id.is_none()
            && self.is_archived.is_none()
            && self.target_days.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.reminder.is_none()
    }
}

impl Habit {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let frequency: String = row.get("frequency")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            frequency: Frequency::from_str(&frequency).unwrap_or_default(),
            category_id: row.get("category_id")?,
            is_archived: row.get::<_, i32>("is_archived")? != 0,
            target_days: row.get("target_days")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            reminder: row.get("reminder")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a new habit
    pub fn create(conn: &Connection, data: &HabitCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO habits (
                user_id, name, description, frequency, category_id,
                target_days, start_date, end_date, reminder
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.user_id,
                data.name,
                data.description,
                data.frequency.as_str(),
                data.category_id,
                data.target_days,
                data.start_date,
                data.end_date,
                data.reminder,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id, &data.user_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a habit by ID, only if it belongs to `user_id`
    pub fn get_by_id(conn: &Connection, id: i64, user_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM habits WHERE id = ?1 AND user_id = ?2")?;

        let result = stmt.query_row(params![id, user_id], Self::from_row);
        match result {
            Ok(habit) => Ok(Some(habit)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all habits of a user, newest first
    pub fn list_for_user(conn: &Connection, user_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM habits WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let habits = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    /// List a user's habits filed under a category, newest first
    pub fn list_for_category(conn: &Connection, category_id: i64, user_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM habits
            WHERE category_id = ?1 AND user_id = ?2
            ORDER BY created_at DESC, id DESC
            "#,
        )?;

        let habits = stmt
            .query_map(params![category_id, user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    /// Update a habit
    pub fn update(conn: &Connection, id: i64, user_id: &str, data: &HabitUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            params_vec.push(Box::new(name.clone()));
            updates.push(format!("name = ?{}", params_vec.len()));
        }
        if let Some(ref description) = data.description {
            params_vec.push(Box::new(description.clone()));
            updates.push(format!("description = ?{}", params_vec.len()));
        }
        if let Some(frequency) = data.frequency {
            params_vec.push(Box::new(frequency.as_str()));
            updates.push(format!("frequency = ?{}", params_vec.len()));
        }
        if let Some(category_id) = data.category_id {
            params_vec.push(Box::new(category_id));
            updates.push(format!("category_id = ?{}", params_vec.len()));
        }
        if let Some(is_archived) = data.is_archived {
            params_vec.push(Box::new(is_archived as i32));
            updates.push(format!("is_archived = ?{}", params_vec.len()));
        }
        if let Some(target_days) = data.target_days {
            params_vec.push(Box::new(target_days));
            updates.push(format!("target_days = ?{}", params_vec.len()));
        }
        if let Some(ref start_date) = data.start_date {
            params_vec.push(Box::new(start_date.clone()));
            updates.push(format!("start_date = ?{}", params_vec.len()));
        }
        if let Some(ref end_date) = data.end_date {
            params_vec.push(Box::new(end_date.clone()));
            updates.push(format!("end_date = ?{}", params_vec.len()));
        }
        if let Some(ref reminder) = data.reminder {
            params_vec.push(Box::new(reminder.clone()));
            updates.push(format!("reminder = ?{}", params_vec.len()));
        }

        if !updates.is_empty() {
            params_vec.push(Box::new(id));
            let id_idx = params_vec.len();
            params_vec.push(Box::new(user_id.to_string()));
            let user_idx = params_vec.len();

            let sql = format!(
                "UPDATE habits SET {} WHERE id = ?{} AND user_id = ?{}",
                updates.join(", "),
                id_idx,
                user_idx
            );
            let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_refs.as_slice())?;
        }

        Self::get_by_id(conn, id, user_id)
    }

    /// Delete a habit and, through the foreign key, its progress records
    pub fn delete(conn: &Connection, id: i64, user_id: &str) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_round_trips_through_storage_name() {
        for frequency in Frequency::ALL {
            assert_eq!(Frequency::from_str(frequency.as_str()), Some(frequency));
        }
        assert_eq!(Frequency::from_str("Weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::from_str("fortnightly"), None);
    }

    #[test]
    fn test_frequency_index_matches_all() {
        for (i, frequency) in Frequency::ALL.iter().enumerate() {
            assert_eq!(frequency.index(), i);
        }
    }
}
