//! Category MCP Tools
//!
//! Tools for creating and organizing habit categories.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Category, CategoryCreate, CategoryUpdate, MAX_CATEGORY_NAME_LEN};

/// Category summary for listing
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub habit_count: i64,
}

/// Response for list_categories
#[derive(Debug, Serialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategorySummary>,
    pub total: usize,
}

/// Response for delete_category
#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub success: bool,
    pub deleted_id: i64,
    /// Habits that were filed under the category and are now uncategorized
    pub habits_uncategorized: i64,
}

fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(format!("Category name cannot exceed {} characters", MAX_CATEGORY_NAME_LEN));
    }
    Ok(())
}

/// Names are unique per user, ignoring case. `own_id` is the category being renamed.
fn check_name_available(
    conn: &rusqlite::Connection,
    user_id: &str,
    name: &str,
    own_id: Option<i64>,
) -> Result<(), String> {
    let existing = Category::find_by_name(conn, user_id, name)
        .map_err(|e| format!("Database error checking category name: {}", e))?;
    match existing {
        Some(c) if Some(c.id) != own_id => Err(format!("A category named '{}' already exists", c.name)),
        _ => Ok(()),
    }
}

/// Colors are `#rgb` or `#rrggbb` hex strings
fn validate_color(color: &str) -> Result<(), String> {
    let hex = color
        .strip_prefix('#')
        .filter(|h| h.len() == 3 || h.len() == 6)
        .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()));
    match hex {
        Some(_) => Ok(()),
        None => Err(format!("Invalid color '{}': expected #rrggbb", color)),
    }
}

fn summarize(conn: &rusqlite::Connection, category: Category) -> Result<CategorySummary, String> {
    let habit_count = Category::habit_count(conn, category.id)
        .map_err(|e| format!("Failed to count habits: {}", e))?;
    Ok(CategorySummary {
        id: category.id,
        name: category.name,
        color: category.color,
        icon: category.icon,
        habit_count,
    })
}

/// Create a category
pub fn create_category(db: &Database, mut data: CategoryCreate) -> Result<Category, String> {
    validate_name(&data.name)?;
    data.name = data.name.trim().to_string();
    if let Some(ref color) = data.color {
        validate_color(color)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    check_name_available(&conn, &data.user_id, &data.name, None)?;

    Category::create(&conn, &data).map_err(|e| format!("Failed to create category: {}", e))
}

/// Get a category with its habit count
pub fn get_category(db: &Database, id: i64, user_id: &str) -> Result<Option<CategorySummary>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let category = Category::get_by_id(&conn, id, user_id)
        .map_err(|e| format!("Failed to get category: {}", e))?;

    category.map(|c| summarize(&conn, c)).transpose()
}

/// List a user's categories
pub fn list_categories(db: &Database, user_id: &str) -> Result<ListCategoriesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let categories = Category::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to list categories: {}", e))?;

    let summaries = categories
        .into_iter()
        .map(|c| summarize(&conn, c))
        .collect::<Result<Vec<_>, _>>()?;
    let total = summaries.len();

    Ok(ListCategoriesResponse {
        categories: summaries,
        total,
    })
}

/// Update a category's name, color or icon
pub fn update_category(
    db: &Database,
    id: i64,
    user_id: &str,
    mut data: CategoryUpdate,
) -> Result<Option<Category>, String> {
    if let Some(ref name) = data.name {
        validate_name(name)?;
        data.name = Some(name.trim().to_string());
    }
    if let Some(ref color) = data.color {
        validate_color(color)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    if let Some(ref name) = data.name {
        check_name_available(&conn, user_id, name, Some(id))?;
    }

    Category::update(&conn, id, user_id, &data).map_err(|e| format!("Failed to update category: {}", e))
}

/// Delete a category; its habits remain, uncategorized
pub fn delete_category(db: &Database, id: i64, user_id: &str) -> Result<Option<DeleteCategoryResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Category::get_by_id(&conn, id, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Ok(None);
    }

    let habits_uncategorized = Category::habit_count(&conn, id)
        .map_err(|e| format!("Failed to count habits: {}", e))?;

    let deleted = Category::delete(&conn, id, user_id)
        .map_err(|e| format!("Failed to delete category: {}", e))?;

    Ok(Some(DeleteCategoryResponse {
        success: deleted,
        deleted_id: id,
        habits_uncategorized,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::setup;

    fn new_category(user_id: &str, name: &str) -> CategoryCreate {
        CategoryCreate {
            user_id: user_id.to_string(),
            name: name.to_string(),
            color: None,
            icon: None,
        }
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#2196f3").is_ok());
        assert!(validate_color("#FFF").is_ok());
        assert!(validate_color("2196f3").is_err());
        assert!(validate_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_create_trims_and_rejects_blank_names() {
        let db = setup();
        assert!(create_category(&db, new_category("alice", "   ")).is_err());

        let category = create_category(&db, new_category("alice", "  Health ")).unwrap();
        assert_eq!(category.name, "Health");
        assert_eq!(category.color, "#2196f3");
    }

    #[test]
    fn test_categories_are_scoped_to_user() {
        let db = setup();
        let category = create_category(&db, new_category("alice", "Health")).unwrap();
        create_category(&db, new_category("bob", "Work")).unwrap();

        let listed = list_categories(&db, "alice").unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.categories[0].name, "Health");
        assert!(get_category(&db, category.id, "bob").unwrap().is_none());
        assert!(delete_category(&db, category.id, "bob").unwrap().is_none());
    }

    #[test]
    fn test_update_category() {
        let db = setup();
        let category = create_category(&db, new_category("alice", "Health")).unwrap();

        let updated = update_category(&db, category.id, "alice", CategoryUpdate {
            name: None,
            color: Some("#ff5722".to_string()),
            icon: Some("heart".to_string()),
        })
        .unwrap()
        .unwrap();

        assert_eq!(updated.name, "Health");
        assert_eq!(updated.color, "#ff5722");
        assert_eq!(updated.icon.as_deref(), Some("heart"));
        assert!(update_category(&db, category.id, "alice", CategoryUpdate {
            color: Some("red".to_string()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_name_length_limit() {
        let db = setup();
        assert!(create_category(&db, new_category("alice", &"x".repeat(51))).is_err());
        let category = create_category(&db, new_category("alice", &"x".repeat(50))).unwrap();

        assert!(update_category(&db, category.id, "alice", CategoryUpdate {
            name: Some("y".repeat(51)),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_names_are_unique_per_user() {
        let db = setup();
        let health = create_category(&db, new_category("alice", "Health")).unwrap();
        let work = create_category(&db, new_category("alice", "Work")).unwrap();

        assert!(create_category(&db, new_category("alice", "health")).is_err());
        assert!(create_category(&db, new_category("bob", "Health")).is_ok());

        assert!(update_category(&db, work.id, "alice", CategoryUpdate {
            name: Some("HEALTH".to_string()),
            ..Default::default()
        })
        .is_err());

        // Renaming a category to its own name (any case) is fine
        let renamed = update_category(&db, health.id, "alice", CategoryUpdate {
            name: Some("HEALTH".to_string()),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(renamed.name, "HEALTH");
        assert_eq!(list_categories(&db, "alice").unwrap().total, 2);
    }
}
