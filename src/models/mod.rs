//! Data models
//!
//! Rust structs representing database entities.

mod category;
mod habit;
mod progress;

pub use category::{Category, CategoryCreate, CategoryUpdate, DEFAULT_COLOR, MAX_CATEGORY_NAME_LEN};
pub use habit::{Frequency, Habit, HabitCreate, HabitUpdate, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
pub use progress::{ProgressLog, ProgressRecord};
