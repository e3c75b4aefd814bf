//! Statistics result types
//!
//! Immutable values handed back to callers and serialized as JSON. Field
//! names are camelCase and rates are percentages in `0.0..=100.0`.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::models::Frequency;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Completed-record counts per weekday.
///
/// Serializes as a `{"Monday": n, ...}` object in calendar order, leaving
/// out weekdays that never saw a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayHistogram {
    counts: [u32; 7],
}

impl WeekdayHistogram {
    pub fn increment(&mut self, day: Weekday) {
        self.counts[day.num_days_from_monday() as usize] += 1;
    }

    pub fn get(&self, day: Weekday) -> u32 {
        self.counts[day.num_days_from_monday() as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Weekdays with at least one completion, Monday first
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, u32)> + '_ {
        WEEKDAYS
            .iter()
            .map(move |&day| (day, self.get(day)))
            .filter(|&(_, count)| count > 0)
    }
}

impl Serialize for WeekdayHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (day, count) in self.iter() {
            map.serialize_entry(weekday_name(day), &count)?;
        }
        map.end()
    }
}

/// Habit counts per frequency type; serializes like [`WeekdayHistogram`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyHistogram {
    counts: [u32; 3],
}

impl FrequencyHistogram {
    pub fn increment(&mut self, frequency: Frequency) {
        self.counts[frequency.index()] += 1;
    }

    pub fn get(&self, frequency: Frequency) -> u32 {
        self.counts[frequency.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Frequency, u32)> + '_ {
        Frequency::ALL
            .iter()
            .map(move |&f| (f, self.get(f)))
            .filter(|&(_, count)| count > 0)
    }
}

impl Serialize for FrequencyHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (frequency, count) in self.iter() {
            map.serialize_entry(frequency.display_name(), &count)?;
        }
        map.end()
    }
}

/// Metrics for a single habit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub habit_id: i64,
    pub habit_name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completion_rate: f64,
    pub total_completions: u32,
    pub days_tracked: u32,
    #[serde(rename = "completionsByDay")]
    pub completions_by_day_of_week: WeekdayHistogram,
}

/// Roll-up over the habits filed under one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category_id: i64,
    pub category_name: String,
    pub total_habits: u32,
    pub active_habits: u32,
    pub average_completion_rate: f64,
    pub habits_by_frequency: FrequencyHistogram,
}

/// Roll-up over everything a user tracks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_habits: u32,
    pub active_habits: u32,
    pub total_categories: u32,
    pub overall_completion_rate: f64,
    /// Keyed by category name; categories without habits are absent
    pub completion_rate_by_category: BTreeMap<String, f64>,
    pub top_performing_habits: Vec<HabitStats>,
    pub needs_attention_habits: Vec<HabitStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_histogram_serializes_in_calendar_order() {
        let mut histogram = WeekdayHistogram::default();
        histogram.increment(Weekday::Sun);
        histogram.increment(Weekday::Mon);
        histogram.increment(Weekday::Mon);

        let json = serde_json::to_string(&histogram).unwrap();
        assert_eq!(json, r#"{"Monday":2,"Sunday":1}"#);
    }

    #[test]
    fn test_empty_histograms_serialize_as_empty_objects() {
        assert_eq!(serde_json::to_string(&WeekdayHistogram::default()).unwrap(), "{}");
        assert_eq!(serde_json::to_string(&FrequencyHistogram::default()).unwrap(), "{}");
    }

    #[test]
    fn test_frequency_histogram_uses_display_names() {
        let mut histogram = FrequencyHistogram::default();
        histogram.increment(Frequency::Weekly);
        histogram.increment(Frequency::Daily);
        histogram.increment(Frequency::Weekly);

        assert_eq!(histogram.get(Frequency::Weekly), 2);
        assert_eq!(histogram.get(Frequency::Monthly), 0);
        let json = serde_json::to_string(&histogram).unwrap();
        assert_eq!(json, r#"{"Daily":1,"Weekly":2}"#);
    }

    #[test]
    fn test_habit_stats_field_names() {
        let stats = HabitStats {
            habit_id: 7,
            habit_name: "Read".to_string(),
            current_streak: 1,
            longest_streak: 2,
            completion_rate: 50.0,
            total_completions: 1,
            days_tracked: 2,
            completions_by_day_of_week: WeekdayHistogram::default(),
        };

        let value = serde_json::to_value(&stats).unwrap();
        for key in [
            "habitId",
            "habitName",
            "currentStreak",
            "longestStreak",
            "completionRate",
            "totalCompletions",
            "daysTracked",
            "completionsByDay",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
