//! Habitual Library
//!
//! Habit tracking with streaks, completion rates and category roll-ups.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod stats;
pub mod store;
pub mod tools;
