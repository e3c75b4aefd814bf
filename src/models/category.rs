//! Category model
//!
//! A named, colored grouping of habits owned by one user.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

pub const DEFAULT_COLOR: &str = "#2196f3";
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

/// A category record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub created_at: String,
}

/// Data for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub user_id: String,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Data for updating a category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl Category {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            icon: row.get("icon")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a new category
    pub fn create(conn: &Connection, data: &CategoryCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO categories (user_id, name, color, icon) VALUES (?1, ?2, ?3, ?4)",
            params![
                data.user_id,
                data.name,
                data.color.as_deref().unwrap_or(DEFAULT_COLOR),
                data.icon,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id, &data.user_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a category by ID, only if it belongs to `user_id`
    pub fn get_by_id(conn: &Connection, id: i64, user_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM categories WHERE id = ?1 AND user_id = ?2")?;

        let result = stmt.query_row(params![id, user_id], Self::from_row);
        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Find one of the user's categories by name, ignoring case
    pub fn find_by_name(conn: &Connection, user_id: &str, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM categories WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE",
        )?;

        let result = stmt.query_row(params![user_id, name], Self::from_row);
        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's categories by name
    pub fn list_for_user(conn: &Connection, user_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM categories WHERE user_id = ?1 ORDER BY name, id")?;

        let categories = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Number of habits filed under a category
    pub fn habit_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE category_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Update a category
    pub fn update(conn: &Connection, id: i64, user_id: &str, data: &CategoryUpdate) -> DbResult<Option<Self>> {
        conn.execute(
            r#"
            UPDATE categories SET
                name = COALESCE(?1, name),
                color = COALESCE(?2, color),
                icon = COALESCE(?3, icon)
            WHERE id = ?4 AND user_id = ?5
            "#,
            params![data.name, data.color, data.icon, id, user_id],
        )?;

        Self::get_by_id(conn, id, user_id)
    }

    /// Delete a category. Its habits stay, uncategorized.
    pub fn delete(conn: &Connection, id: i64, user_id: &str) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}
