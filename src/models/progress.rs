//! Progress model
//!
//! One completion record per habit per calendar day.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A single day's completion record for a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: i64,
    pub habit_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
}

/// Data for logging progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressLog {
    pub habit_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
}

impl ProgressRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            habit_id: row.get("habit_id")?,
            date: row.get("date")?,
            completed: row.get::<_, i32>("completed")? != 0,
            notes: row.get("notes")?,
        })
    }

    /// Record progress for a day, replacing whatever was logged for that day before
    pub fn upsert(conn: &Connection, data: &ProgressLog) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO habit_progress (habit_id, date, completed, notes)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(habit_id, date) DO UPDATE SET
                completed = excluded.completed,
                notes = excluded.notes
            "#,
            params![data.habit_id, data.date, data.completed as i32, data.notes],
        )?;

        Self::get_for_date(conn, data.habit_id, data.date)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get the record for a habit on a given day
    pub fn get_for_date(conn: &Connection, habit_id: i64, date: NaiveDate) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM habit_progress WHERE habit_id = ?1 AND date = ?2")?;

        let result = stmt.query_row(params![habit_id, date], Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a habit's records, oldest first, optionally bounded (inclusive)
    pub fn list_for_habit(
        conn: &Connection,
        habit_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM habit_progress WHERE habit_id = ?1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(habit_id)];

        if let Some(start) = start_date {
            params_vec.push(Box::new(start));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date ASC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let records = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Delete a habit's record for a day
    pub fn delete_for_date(conn: &Connection, habit_id: i64, date: NaiveDate) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM habit_progress WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, date],
        )?;
        Ok(rows > 0)
    }
}
