//! Habitual MCP Server Implementation
//!
//! Implements the MCP server with all Habitual tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::Database;
use crate::models::{CategoryCreate, CategoryUpdate, Frequency, HabitCreate, HabitUpdate};
use crate::tools::categories;
use crate::tools::habits;
use crate::tools::statistics;
use crate::tools::status::{StatusTracker, HABIT_INSTRUCTIONS};

/// Habitual MCP Service
#[derive(Clone)]
pub struct HabitualService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    /// User acted on when a call doesn't name one
    default_user_id: Arc<str>,
    tool_router: ToolRouter<HabitualService>,
}

impl HabitualService {
    pub fn new(config: &Config, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(config.database_path.clone())),
            database,
            default_user_id: Arc::from(config.default_user_id.as_str()),
            tool_router: Self::tool_router(),
        }
    }

    fn user_id(&self, requested: Option<String>) -> String {
        requested
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_user_id.to_string())
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found_json(what: &str, id: i64) -> String {
    format!(r#"{{"error": "{} not found", "id": {}}}"#, what, id)
}

fn not_found(what: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(not_found_json(what, id))]))
}

fn parse_frequency(s: Option<&str>) -> Result<Option<Frequency>, McpError> {
    match s {
        None => Ok(None),
        Some(s) => Frequency::from_str(s).map(Some).ok_or_else(|| {
            McpError::invalid_params(
                format!("Invalid frequency '{}': expected daily, weekly or monthly", s),
                None,
            )
        }),
    }
}

/// Run a blocking statistics computation off the async runtime
async fn blocking<T, F>(f: F) -> Result<T, McpError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?
        .map_err(|e| McpError::internal_error(e, None))
}

// ============================================================================
// Habit Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit (max 100 characters)
    pub name: String,
    /// Optional description (max 500 characters)
    #[serde(default)]
    pub description: String,
    /// daily, weekly or monthly (default daily)
    pub frequency: Option<String>,
    /// Category to file the habit under
    pub category_id: Option<i64>,
    /// Target number of days
    pub target_days: Option<i32>,
    /// Start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Free-form reminder text, e.g. "08:00"
    pub reminder: Option<String>,
    /// Owning user (defaults to the configured user)
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetHabitParams {
    /// Habit ID
    pub id: i64,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListHabitsParams {
    /// Include archived habits (default false)
    #[serde(default)]
    pub include_archived: bool,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateHabitParams {
    /// Habit ID
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    /// daily, weekly or monthly
    pub frequency: Option<String>,
    /// Move the habit into this category
    pub category_id: Option<i64>,
    /// Remove the habit from its category (takes precedence over category_id)
    #[serde(default)]
    pub clear_category: bool,
    /// Archive (true) or restore (false) the habit
    pub is_archived: Option<bool>,
    pub target_days: Option<i32>,
    /// Start date (YYYY-MM-DD); an empty string clears it
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD); an empty string clears it
    pub end_date: Option<String>,
    /// Reminder text; an empty string clears it
    pub reminder: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteHabitParams {
    /// Habit ID to delete (progress history is deleted too)
    pub id: i64,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListHabitsByCategoryParams {
    /// Category ID
    pub category_id: i64,
    pub user_id: Option<String>,
}

// ============================================================================
// Progress Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogProgressParams {
    /// Habit ID
    pub habit_id: i64,
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// Whether the habit was done that day (default true)
    #[serde(default = "default_true")]
    pub completed: bool,
    pub notes: Option<String>,
    pub user_id: Option<String>,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetHabitProgressParams {
    /// Habit ID
    pub habit_id: i64,
    /// Inclusive start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub end_date: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteProgressParams {
    /// Habit ID
    pub habit_id: i64,
    /// Date of the record to remove (YYYY-MM-DD)
    pub date: String,
    pub user_id: Option<String>,
}

// ============================================================================
// Category Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateCategoryParams {
    /// Name of the category
    pub name: String,
    /// Hex color, e.g. "#2196f3" (the default)
    pub color: Option<String>,
    /// Icon name
    pub icon: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCategoryParams {
    /// Category ID
    pub id: i64,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCategoriesParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCategoryParams {
    /// Category ID
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteCategoryParams {
    /// Category ID to delete (its habits become uncategorized)
    pub id: i64,
    pub user_id: Option<String>,
}

// ============================================================================
// Statistics Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HabitStatisticsParams {
    /// Habit ID
    pub habit_id: i64,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CategoryStatisticsParams {
    /// Category ID
    pub category_id: i64,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserStatisticsParams {
    pub user_id: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl HabitualService {
    // ---- Status ----

    #[tool(description = "Get the current status of the Habitual service including build info, database status, and process information")]
    async fn habitual_status(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.status_tracker.get_status())
    }

    #[tool(description = "Get instructions for tracking habits and reading statistics. Call this when starting a habit tracking session.")]
    fn habit_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(HABIT_INSTRUCTIONS)]))
    }

    // ---- Habits ----

    #[tool(description = "Create a new habit, optionally filed under a category")]
    fn create_habit(&self, Parameters(p): Parameters<CreateHabitParams>) -> Result<CallToolResult, McpError> {
        let data = HabitCreate {
            user_id: self.user_id(p.user_id),
            name: p.name,
            description: p.description,
            frequency: parse_frequency(p.frequency.as_deref())?.unwrap_or_default(),
            category_id: p.category_id,
            target_days: p.target_days,
            start_date: p.start_date,
            end_date: p.end_date,
            reminder: p.reminder,
        };
        let result = habits::create_habit(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a habit by ID")]
    fn get_habit(&self, Parameters(p): Parameters<GetHabitParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        match habits::get_habit(&self.database, p.id, &user_id).map_err(|e| McpError::internal_error(e, None))? {
            Some(habit) => json_result(&habit),
            None => not_found("Habit", p.id),
        }
    }

    #[tool(description = "List habits, newest first. Archived habits are hidden unless include_archived is true.")]
    fn list_habits(&self, Parameters(p): Parameters<ListHabitsParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        let result = habits::list_habits(&self.database, &user_id, p.include_archived)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List the habits filed under a category")]
    fn list_habits_by_category(&self, Parameters(p): Parameters<ListHabitsByCategoryParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        match habits::list_habits_by_category(&self.database, p.category_id, &user_id)
            .map_err(|e| McpError::internal_error(e, None))?
        {
            Some(result) => json_result(&result),
            None => not_found("Category", p.category_id),
        }
    }

    #[tool(description = "Update a habit. Only provided fields change. Use is_archived to archive or restore.")]
    fn update_habit(&self, Parameters(p): Parameters<UpdateHabitParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        let category_id = if p.clear_category {
            Some(None)
        } else {
            p.category_id.map(Some)
        };
        let data = HabitUpdate {
            name: p.name,
            description: p.description,
            frequency: parse_frequency(p.frequency.as_deref())?,
            category_id,
            is_archived: p.is_archived,
            target_days: p.target_days,
            start_date: p.start_date.map(Some),
            end_date: p.end_date.map(Some),
            reminder: p.reminder.map(Some),
        };
        match habits::update_habit(&self.database, p.id, &user_id, data).map_err(|e| McpError::internal_error(e, None))? {
            Some(habit) => json_result(&habit),
            None => not_found("Habit", p.id),
        }
    }

    #[tool(description = "Delete a habit and its entire progress history. Prefer archiving to keep history.")]
    fn delete_habit(&self, Parameters(p): Parameters<DeleteHabitParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        let result = habits::delete_habit(&self.database, p.id, &user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // ---- Progress ----

    #[tool(description = "Log whether a habit was completed on a day (default today). Logging the same day again replaces the earlier record.")]
    fn log_progress(&self, Parameters(p): Parameters<LogProgressParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        match habits::log_progress(&self.database, p.habit_id, &user_id, p.date.as_deref(), p.completed, p.notes)
            .map_err(|e| McpError::internal_error(e, None))?
        {
            Some(result) => json_result(&result),
            None => not_found("Habit", p.habit_id),
        }
    }

    #[tool(description = "Get a habit's progress records, oldest first, optionally within an inclusive date range")]
    fn get_habit_progress(&self, Parameters(p): Parameters<GetHabitProgressParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        match habits::get_habit_progress(
            &self.database,
            p.habit_id,
            &user_id,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?
        {
            Some(result) => json_result(&result),
            None => not_found("Habit", p.habit_id),
        }
    }

    #[tool(description = "Delete a habit's progress record for one day")]
    fn delete_progress(&self, Parameters(p): Parameters<DeleteProgressParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        match habits::delete_progress(&self.database, p.habit_id, &user_id, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?
        {
            Some(deleted) => json_result(&serde_json::json!({
                "success": deleted,
                "habit_id": p.habit_id,
                "date": p.date,
            })),
            None => not_found("Habit", p.habit_id),
        }
    }

    // ---- Categories ----

    #[tool(description = "Create a category for grouping habits")]
    fn create_category(&self, Parameters(p): Parameters<CreateCategoryParams>) -> Result<CallToolResult, McpError> {
        let data = CategoryCreate {
            user_id: self.user_id(p.user_id),
            name: p.name,
            color: p.color,
            icon: p.icon,
        };
        let result = categories::create_category(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a category with its habit count")]
    fn get_category(&self, Parameters(p): Parameters<GetCategoryParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        match categories::get_category(&self.database, p.id, &user_id).map_err(|e| McpError::internal_error(e, None))? {
            Some(category) => json_result(&category),
            None => not_found("Category", p.id),
        }
    }

    #[tool(description = "List categories by name with their habit counts")]
    fn list_categories(&self, Parameters(p): Parameters<ListCategoriesParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        let result = categories::list_categories(&self.database, &user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a category's name, color or icon")]
    fn update_category(&self, Parameters(p): Parameters<UpdateCategoryParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        let data = CategoryUpdate {
            name: p.name,
            color: p.color,
            icon: p.icon,
        };
        match categories::update_category(&self.database, p.id, &user_id, data)
            .map_err(|e| McpError::internal_error(e, None))?
        {
            Some(category) => json_result(&category),
            None => not_found("Category", p.id),
        }
    }

    #[tool(description = "Delete a category. Its habits are kept and become uncategorized.")]
    fn delete_category(&self, Parameters(p): Parameters<DeleteCategoryParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user_id(p.user_id);
        match categories::delete_category(&self.database, p.id, &user_id)
            .map_err(|e| McpError::internal_error(e, None))?
        {
            Some(result) => json_result(&result),
            None => not_found("Category", p.id),
        }
    }

    // ---- Statistics ----

    #[tool(description = "Get statistics for one habit: current and longest streak, completion rate, totals, and completions by weekday")]
    async fn get_habit_statistics(&self, Parameters(p): Parameters<HabitStatisticsParams>) -> Result<CallToolResult, McpError> {
        let db = self.database.clone();
        let user_id = self.user_id(p.user_id);
        let habit_id = p.habit_id;
        match blocking(move || statistics::get_habit_statistics(&db, habit_id, &user_id)).await? {
            Some(stats) => json_result(&stats),
            None => not_found("Habit", habit_id),
        }
    }

    #[tool(description = "Get statistics for a category: habit counts, active count, average completion rate, and habits by frequency")]
    async fn get_category_statistics(&self, Parameters(p): Parameters<CategoryStatisticsParams>) -> Result<CallToolResult, McpError> {
        let db = self.database.clone();
        let user_id = self.user_id(p.user_id);
        let category_id = p.category_id;
        match blocking(move || statistics::get_category_statistics(&db, category_id, &user_id)).await? {
            Some(stats) => json_result(&stats),
            None => not_found("Category", category_id),
        }
    }

    #[tool(description = "Get statistics across all of a user's habits: overall completion rate, rate per category, top performing and needs-attention habits")]
    async fn get_user_statistics(&self, Parameters(p): Parameters<UserStatisticsParams>) -> Result<CallToolResult, McpError> {
        let db = self.database.clone();
        let user_id = self.user_id(p.user_id);
        let stats = blocking(move || statistics::get_user_statistics(&db, &user_id)).await?;
        json_result(&stats)
    }

    #[tool(description = "Get user, category and habit statistics in a single response")]
    async fn get_statistics_overview(&self, Parameters(p): Parameters<UserStatisticsParams>) -> Result<CallToolResult, McpError> {
        let db = self.database.clone();
        let user_id = self.user_id(p.user_id);
        let overview = blocking(move || statistics::get_statistics_overview(&db, &user_id)).await?;
        json_result(&overview)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for HabitualService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "habitual".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Habitual".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Habitual - habit tracking with streaks and completion statistics. \
                 IMPORTANT: Call habit_instructions first. \
                 Habits: create/get/list/update/delete_habit, list_habits_by_category. \
                 Progress: log_progress/get_habit_progress/delete_progress. \
                 Categories: create/get/list/update/delete_category. \
                 Statistics: get_habit_statistics, get_category_statistics, get_user_statistics, get_statistics_overview. \
                 All tools take an optional user_id."
                    .into(),
            ),
        }
    }
}
