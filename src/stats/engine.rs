//! Statistics engine
//!
//! Fetches habits and progress through a [`HabitStore`] and rolls the
//! per-habit metrics up to category and user scope.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::metrics;
use super::types::{CategoryStats, FrequencyHistogram, HabitStats, UserStats};
use crate::db::DbError;
use crate::models::{Category, Habit};
use crate::store::HabitStore;

/// How many habits the ranked lists of [`UserStats`] hold at most
pub const RANKING_SIZE: usize = 5;

/// Habits completing less often than this (percent) need attention
pub const ATTENTION_THRESHOLD: f64 = 50.0;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Missing, or owned by another user
    #[error("Habit with ID {0} not found")]
    HabitNotFound(i64),

    /// Missing, or owned by another user
    #[error("Category with ID {0} not found")]
    CategoryNotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl StatsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StatsError::HabitNotFound(_) | StatsError::CategoryNotFound(_))
    }
}

pub type StatsResult<T> = Result<T, StatsError>;

pub struct StatisticsEngine<S> {
    store: S,
}

impl<S: HabitStore> StatisticsEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Metrics for one habit owned by `user_id`
    pub fn habit_stats(&self, habit_id: i64, user_id: &str) -> StatsResult<HabitStats> {
        let habit = self
            .store
            .fetch_habit(habit_id, user_id)?
            .ok_or(StatsError::HabitNotFound(habit_id))?;

        let records = self.store.fetch_progress_for_habit(habit.id)?;
        tracing::debug!(habit_id, records = records.len(), "computing habit statistics");

        Ok(metrics::summarize(&habit, &records))
    }

    /// Roll-up over the habits filed under one of the user's categories
    pub fn category_stats(&self, category_id: i64, user_id: &str) -> StatsResult<CategoryStats> {
        let category = self
            .store
            .fetch_category(category_id, user_id)?
            .ok_or(StatsError::CategoryNotFound(category_id))?;

        let habits = self.store.fetch_habits_by_category(category_id, user_id)?;
        let habit_stats = habits
            .iter()
            .map(|h| self.habit_stats(h.id, user_id))
            .collect::<StatsResult<Vec<_>>>()?;

        Ok(roll_up_category(&category, &habits, &habit_stats))
    }

    /// Roll-up over everything the user tracks
    pub fn user_stats(&self, user_id: &str) -> StatsResult<UserStats> {
        let habits = self.store.fetch_habits_by_user(user_id)?;
        let categories = self.store.fetch_categories_by_user(user_id)?;
        tracing::debug!(
            user_id,
            habits = habits.len(),
            categories = categories.len(),
            "computing user statistics"
        );

        let habit_stats = habits
            .iter()
            .map(|h| self.habit_stats(h.id, user_id))
            .collect::<StatsResult<Vec<_>>>()?;

        // Category roll-ups reuse the per-habit results computed above
        let by_id: HashMap<i64, &HabitStats> = habit_stats.iter().map(|s| (s.habit_id, s)).collect();

        let mut completion_rate_by_category = BTreeMap::new();
        for category in &categories {
            let members = self.store.fetch_habits_by_category(category.id, user_id)?;
            if members.is_empty() {
                continue;
            }

            let member_stats = members
                .iter()
                .map(|h| match by_id.get(&h.id) {
                    Some(stats) => Ok((*stats).clone()),
                    None => self.habit_stats(h.id, user_id),
                })
                .collect::<StatsResult<Vec<_>>>()?;

            let rollup = roll_up_category(category, &members, &member_stats);
            completion_rate_by_category.insert(category.name.clone(), rollup.average_completion_rate);
        }

        let mut top_performing_habits = habit_stats.clone();
        top_performing_habits.sort_by(|a, b| by_rate(b, a));
        top_performing_habits.truncate(RANKING_SIZE);

        let mut needs_attention_habits: Vec<HabitStats> = habit_stats
            .iter()
            .filter(|s| s.completion_rate < ATTENTION_THRESHOLD)
            .cloned()
            .collect();
        needs_attention_habits.sort_by(by_rate);
        needs_attention_habits.truncate(RANKING_SIZE);

        Ok(UserStats {
            total_habits: habits.len() as u32,
            active_habits: count_active(&habits),
            total_categories: categories.len() as u32,
            overall_completion_rate: mean_rate(&habit_stats),
            completion_rate_by_category,
            top_performing_habits,
            needs_attention_habits,
        })
    }
}

fn roll_up_category(category: &Category, habits: &[Habit], stats: &[HabitStats]) -> CategoryStats {
    let mut habits_by_frequency = FrequencyHistogram::default();
    for habit in habits {
        habits_by_frequency.increment(habit.frequency);
    }

    CategoryStats {
        category_id: category.id,
        category_name: category.name.clone(),
        total_habits: habits.len() as u32,
        active_habits: count_active(habits),
        average_completion_rate: mean_rate(stats),
        habits_by_frequency,
    }
}

fn count_active(habits: &[Habit]) -> u32 {
    habits.iter().filter(|h| !h.is_archived).count() as u32
}

fn mean_rate(stats: &[HabitStats]) -> f64 {
    if stats.is_empty() {
        return 0.0;
    }
    stats.iter().map(|s| s.completion_rate).sum::<f64>() / stats.len() as f64
}

fn by_rate(a: &HabitStats, b: &HabitStats) -> Ordering {
    a.completion_rate.total_cmp(&b.completion_rate)
}
