//! Habitual Status Tool
//!
//! Provides runtime status information about the Habitual service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Habit tracking instructions for AI assistants
pub const HABIT_INSTRUCTIONS: &str = r#"
# Habitual Instructions

## Overview

1. **Categories** (optional) group related habits, e.g. "Health" or "Learning".
2. **Habits** are the things being tracked. Each has a frequency tag
   (daily, weekly, monthly); the tag is informational only.
3. **Progress** is one record per habit per calendar day: completed or not.
4. **Statistics** are computed from the progress history on every request.

Every tool accepts an optional `user_id`. When it is omitted the server's
configured user is used.

---

## Logging a Day

- `log_progress` with `habit_id`, `completed`, and optionally `date`
  (YYYY-MM-DD, defaults to today).
- Logging the same habit and day again replaces the earlier record.
- Log missed days explicitly with `completed: false`; a day with no record
  does not count against the completion rate.

---

## Reading Statistics

| Tool | Scope |
|------|-------|
| `get_habit_statistics` | One habit: streaks, completion rate, completions by weekday |
| `get_category_statistics` | Habit counts and average completion rate for a category |
| `get_user_statistics` | Overall rate, rate per category, top 5 and needs-attention lists |
| `get_statistics_overview` | All of the above in one response |

- **Current streak** counts completed records back from the most recent one
  until the first missed record.
- **Longest streak** only counts completions on consecutive calendar days.
- **Completion rate** is completed records / recorded days x 100.
- Categories with no habits are left out of the per-category rates.
- A habit needs attention when its completion rate is below 50%.

---

## Housekeeping

- Archive habits (`update_habit` with `is_archived: true`) to keep their
  history; `delete_habit` removes the habit and all its progress.
- Deleting a category keeps its habits, uncategorized.
"#;

/// Runtime status of the Habitual service
#[derive(Debug, Clone, Serialize)]
pub struct HabitualStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> HabitualStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        HabitualStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/habitual.db"));
        let status = tracker.get_status();

        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    }
}
