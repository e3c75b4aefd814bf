//! Per-habit metric calculations
//!
//! Pure functions over a habit's progress records. Records may arrive in any
//! order; each function sorts what it needs.

use chrono::{Datelike, NaiveDate};

use super::types::{HabitStats, WeekdayHistogram};
use crate::models::{Habit, ProgressRecord};

/// Share of tracked days that were completed, as a percentage.
///
/// Days with no record at all don't count against the habit.
pub fn completion_rate(completed: u32, tracked: u32) -> f64 {
    if tracked == 0 {
        return 0.0;
    }
    completed as f64 * 100.0 / tracked as f64
}

/// Completed records counted back from the most recent one, stopping at the
/// first incomplete record. Gaps between dates do not break this streak.
pub fn current_streak(records: &[ProgressRecord]) -> u32 {
    let mut ordered: Vec<&ProgressRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    ordered.iter().take_while(|r| r.completed).count() as u32
}

/// Longest run of completed records on calendar-consecutive dates
pub fn longest_streak(records: &[ProgressRecord]) -> u32 {
    let mut ordered: Vec<&ProgressRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.date);

    let mut longest = 0;
    let mut run = 0;
    let mut last_date: Option<NaiveDate> = None;

    for record in ordered {
        if !record.completed {
            run = 0;
            continue;
        }

        let follows_last = match last_date {
            None => true,
            Some(prev) => prev.succ_opt() == Some(record.date),
        };
        run = if follows_last { run + 1 } else { 1 };
        longest = longest.max(run);
        last_date = Some(record.date);
    }

    longest
}

/// Completed records bucketed by weekday
pub fn completions_by_day_of_week(records: &[ProgressRecord]) -> WeekdayHistogram {
    let mut histogram = WeekdayHistogram::default();
    for record in records.iter().filter(|r| r.completed) {
        histogram.increment(record.date.weekday());
    }
    histogram
}

/// All per-habit metrics for one habit's full history
pub fn summarize(habit: &Habit, records: &[ProgressRecord]) -> HabitStats {
    let days_tracked = records.len() as u32;
    let total_completions = records.iter().filter(|r| r.completed).count() as u32;

    HabitStats {
        habit_id: habit.id,
        habit_name: habit.name.clone(),
        current_streak: current_streak(records),
        longest_streak: longest_streak(records),
        completion_rate: completion_rate(total_completions, days_tracked),
        total_completions,
        days_tracked,
        completions_by_day_of_week: completions_by_day_of_week(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc, Weekday};

    // 2025-03-03 is a Monday
    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap() + Duration::days(offset)
    }

    fn record(date: NaiveDate, completed: bool) -> ProgressRecord {
        ProgressRecord {
            id: 0,
            habit_id: 1,
            date,
            completed,
            notes: None,
        }
    }

    fn records(entries: &[(i64, bool)]) -> Vec<ProgressRecord> {
        entries.iter().map(|&(d, c)| record(day(d), c)).collect()
    }

    #[test]
    fn test_no_records() {
        let stats = summarize(&habit(), &[]);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.days_tracked, 0);
        assert!(stats.completions_by_day_of_week.is_empty());
    }

    #[test]
    fn test_single_completed_record() {
        let stats = summarize(&habit(), &records(&[(0, true)]));
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert!((stats.completion_rate - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_consecutive_days_ending_today() {
        let today = Utc::now().date_naive();
        let history: Vec<_> = (0..6).map(|i| record(today - Duration::days(i), true)).collect();

        assert_eq!(current_streak(&history), 6);
        assert_eq!(longest_streak(&history), 6);
    }

    #[test]
    fn test_gap_splits_longest_streak() {
        // Day 1 and day 3 completed, day 2 never logged
        let history = records(&[(0, true), (2, true)]);
        assert_eq!(longest_streak(&history), 1);
        // Current streak only looks at completion flags
        assert_eq!(current_streak(&history), 2);
    }

    #[test]
    fn test_missed_today_breaks_current_streak_only() {
        let mut history = records(&[(0, true), (1, true), (2, true), (3, true)]);
        history.push(record(day(4), false));

        assert_eq!(current_streak(&history), 0);
        assert!(longest_streak(&history) >= 4);
    }

    #[test]
    fn test_worked_example() {
        // Mon T, Tue T, Wed F, Thu T, Fri T
        let history = records(&[(0, true), (1, true), (2, false), (3, true), (4, true)]);
        let stats = summarize(&habit(), &history);

        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.current_streak, 2);
        assert!((stats.completion_rate - 80.0).abs() < 0.001);
    }

    #[test]
    fn test_three_of_five_completed() {
        // Mon T, Tue T, Wed F, Thu T, Fri F
        let history = records(&[(0, true), (1, true), (2, false), (3, true), (4, false)]);
        let stats = summarize(&habit(), &history);

        assert_eq!(stats.total_completions, 3);
        assert_eq!(stats.days_tracked, 5);
        assert!((stats.completion_rate - 60.0).abs() < 0.001);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut history = records(&[(0, true), (1, true), (2, false), (3, true), (4, true), (5, true)]);
        history.reverse();
        history.swap(1, 4);

        assert_eq!(current_streak(&history), 3);
        assert_eq!(longest_streak(&history), 3);
    }

    #[test]
    fn test_completions_by_day_of_week_counts_completed_only() {
        // Two Mondays completed, one Tuesday missed, one Sunday completed
        let history = records(&[(0, true), (1, false), (6, true), (7, true)]);
        let histogram = completions_by_day_of_week(&history);

        assert_eq!(histogram.get(Weekday::Mon), 2);
        assert_eq!(histogram.get(Weekday::Tue), 0);
        assert_eq!(histogram.get(Weekday::Sun), 1);
        assert_eq!(histogram.iter().count(), 2);
    }

    fn habit() -> Habit {
        Habit {
            id: 1,
            user_id: "alice".to_string(),
            name: "Exercise".to_string(),
            description: String::new(),
            frequency: Default::default(),
            category_id: None,
            is_archived: false,
            target_days: None,
            start_date: None,
            end_date: None,
            reminder: None,
            created_at: "2025-03-01 00:00:00".to_string(),
        }
    }
}
