//! Habit statistics
//!
//! Streaks, completion rates and weekday distributions per habit, rolled up
//! to category and user scope. Everything is recomputed from the store on
//! every request.

mod engine;
pub mod metrics;
mod types;

pub use engine::{StatisticsEngine, StatsError, StatsResult};
pub use types::{
    weekday_name, CategoryStats, FrequencyHistogram, HabitStats, UserStats, WeekdayHistogram,
};
