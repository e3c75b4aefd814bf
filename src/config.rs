//! Runtime configuration
//!
//! Everything is read from the environment; there is no config file.

use std::path::PathBuf;

/// Environment variable overriding the SQLite database location
pub const DATABASE_PATH_ENV: &str = "HABITUAL_DATABASE_PATH";

/// Environment variable naming the user that tool calls act on when they
/// don't pass a `user_id` of their own
pub const USER_ID_ENV: &str = "HABITUAL_USER_ID";

pub const DEFAULT_USER_ID: &str = "default-user";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub default_user_id: String,
}

impl Config {
    /// Build the configuration from environment variables
    pub fn from_env() -> Self {
        let default_user_id = std::env::var(USER_ID_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        Self {
            database_path: database_path(),
            default_user_id,
        }
    }
}

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("habitual.db");
            path
        })
}
