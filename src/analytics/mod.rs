//! Analytics over bucketed activity
//!
//! Summaries shown next to the heatmap: totals, the busiest day, streaks
//! and the weekday profile.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::bucket::{ActivityMap, ActivityRecord};
use crate::types::ActivityCount;

/// Streak information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakInfo {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub longest_streak_start: Option<NaiveDate>,
    pub longest_streak_end: Option<NaiveDate>,
}

/// Activity per day of the week
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeekdayProfile {
    /// Totals indexed from Monday
    pub totals: [ActivityCount; 7],
    pub peak_day: Option<Weekday>,
    pub peak_count: ActivityCount,
}

/// Everything `summary` prints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub total: ActivityCount,
    pub active_days: usize,
    pub busiest_day: Option<ActivityRecord>,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub streaks: StreakInfo,
    pub weekdays: WeekdayProfile,
}

impl ActivitySummary {
    /// Mean count over active days.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_per_active_day(&self) -> f64 {
        if self.active_days == 0 {
            return 0.0;
        }
        self.total.as_f64() / self.active_days as f64
    }
}

/// Summarize an activity map as of `today`.
#[must_use]
pub fn summarize(activities: &ActivityMap, today: NaiveDate) -> ActivitySummary {
    let active: Vec<ActivityRecord> = activities.iter().filter(|r| !r.count.is_zero()).collect();
    let span = activities.span();

    // Earliest day wins a tie
    let busiest_day = active.iter().copied().reduce(|best, record| {
        if record.count > best.count {
            record
        } else {
            best
        }
    });

    let dates: Vec<NaiveDate> = active.iter().map(|r| r.date).collect();

    ActivitySummary {
        total: activities.total(),
        active_days: active.len(),
        busiest_day,
        first_day: span.map(|(first, _)| first),
        last_day: span.map(|(_, last)| last),
        streaks: streaks(&dates, today),
        weekdays: weekday_profile(activities),
    }
}

/// Streaks over ascending, distinct active dates.
#[must_use]
pub fn streaks(dates: &[NaiveDate], today: NaiveDate) -> StreakInfo {
    let Some(&first) = dates.first() else {
        return StreakInfo::default();
    };

    // (start, end) of every run of consecutive days
    let mut runs: Vec<(NaiveDate, NaiveDate)> = Vec::new();
    let mut streak_start = first;
    let mut streak_end = first;

    for pair in dates.windows(2) {
        if pair[1].signed_duration_since(pair[0]).num_days() == 1 {
            streak_end = pair[1];
        } else {
            runs.push((streak_start, streak_end));
            streak_start = pair[1];
            streak_end = pair[1];
        }
    }
    runs.push((streak_start, streak_end));

    // First of equally long runs wins
    let (longest_start, longest_end) = runs
        .iter()
        .copied()
        .reduce(|best, run| if run_len(run) > run_len(best) { run } else { best })
        .unwrap_or((streak_start, streak_end));

    // Current streak: the run covering today or yesterday, counted up to today
    let yesterday = today.pred_opt().unwrap_or(today);
    let current_streak = runs
        .iter()
        .find(|&&(start, end)| start <= today && end >= yesterday)
        .map_or(0, |&(start, end)| run_len((start, end.min(today))));

    StreakInfo {
        current_streak,
        longest_streak: run_len((longest_start, longest_end)),
        longest_streak_start: Some(longest_start),
        longest_streak_end: Some(longest_end),
    }
}

fn run_len((start, end): (NaiveDate, NaiveDate)) -> u32 {
    u32::try_from(end.signed_duration_since(start).num_days() + 1).unwrap_or(u32::MAX)
}

/// Totals per weekday and the busiest one.
#[must_use]
pub fn weekday_profile(activities: &ActivityMap) -> WeekdayProfile {
    let mut totals = [ActivityCount::ZERO; 7];
    for record in activities.iter() {
        totals[record.date.weekday().num_days_from_monday() as usize] += record.count;
    }

    let mut profile = WeekdayProfile {
        totals,
        ..WeekdayProfile::default()
    };
    let mut weekday = Weekday::Mon;
    for total in totals {
        if total > profile.peak_count {
            profile.peak_count = total;
            profile.peak_day = Some(weekday);
        }
        weekday = weekday.succ();
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn map(entries: &[(&str, u64)]) -> ActivityMap {
        ActivityMap::from_day_counts(entries.iter().map(|&(k, n)| (k, n))).activities
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&ActivityMap::new(), d(2025, 9, 10));
        assert_eq!(summary, ActivitySummary::default());
        assert!(summary.mean_per_active_day().abs() < f64::EPSILON);
    }

    #[test]
    fn test_totals_and_busiest() {
        let activities = map(&[
            ("2025-09-01", 2),
            ("2025-09-02", 5),
            ("2025-09-04", 5),
            ("2025-09-08", 1),
        ]);
        let summary = summarize(&activities, d(2025, 9, 30));
        assert_eq!(summary.total.get(), 13);
        assert_eq!(summary.active_days, 4);
        assert_eq!(summary.busiest_day.unwrap().date, d(2025, 9, 2));
        assert_eq!(summary.first_day, Some(d(2025, 9, 1)));
        assert_eq!(summary.last_day, Some(d(2025, 9, 8)));
        assert!((summary.mean_per_active_day() - 3.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_longest_streak() {
        let dates = [
            d(2025, 8, 30),
            d(2025, 8, 31),
            d(2025, 9, 1),
            d(2025, 9, 5),
            d(2025, 9, 6),
        ];
        let info = streaks(&dates, d(2025, 10, 1));
        assert_eq!(info.longest_streak, 3);
        assert_eq!(info.longest_streak_start, Some(d(2025, 8, 30)));
        assert_eq!(info.longest_streak_end, Some(d(2025, 9, 1)));
        assert_eq!(info.current_streak, 0);
    }

    #[test]
    fn test_current_streak_ends_today_or_yesterday() {
        let dates = [d(2025, 9, 8), d(2025, 9, 9), d(2025, 9, 10)];
        assert_eq!(streaks(&dates, d(2025, 9, 10)).current_streak, 3);
        assert_eq!(streaks(&dates, d(2025, 9, 11)).current_streak, 3);
        assert_eq!(streaks(&dates, d(2025, 9, 12)).current_streak, 0);
    }

    #[test]
    fn test_current_streak_ignores_days_after_today() {
        let dates = [
            d(2025, 9, 8),
            d(2025, 9, 9),
            d(2025, 9, 10),
            d(2025, 9, 11),
            d(2025, 9, 20),
        ];
        // as of the 10th, the 11th has not happened yet
        assert_eq!(streaks(&dates, d(2025, 9, 10)).current_streak, 3);
        assert_eq!(streaks(&dates, d(2025, 9, 12)).current_streak, 4);
        assert_eq!(streaks(&dates, d(2025, 9, 15)).current_streak, 0);
        assert_eq!(streaks(&dates, d(2025, 9, 7)).current_streak, 0);
    }

    #[test]
    fn test_single_day_streak() {
        let info = streaks(&[d(2024, 2, 29)], d(2024, 2, 29));
        assert_eq!(info.longest_streak, 1);
        assert_eq!(info.current_streak, 1);
    }

    #[test]
    fn test_zero_count_days_break_streaks() {
        let activities = map(&[("2025-09-01", 1), ("2025-09-02", 0), ("2025-09-03", 1)]);
        let summary = summarize(&activities, d(2025, 9, 3));
        assert_eq!(summary.active_days, 2);
        assert_eq!(summary.streaks.longest_streak, 1);
        assert_eq!(summary.streaks.current_streak, 1);
    }

    #[test]
    fn test_weekday_profile() {
        // 2025-09-01 is a Monday, 2025-09-03 a Wednesday
        let activities = map(&[("2025-09-01", 2), ("2025-09-03", 4), ("2025-09-08", 1)]);
        let profile = weekday_profile(&activities);
        assert_eq!(profile.totals[0].get(), 3);
        assert_eq!(profile.totals[2].get(), 4);
        assert_eq!(profile.peak_day, Some(Weekday::Wed));
        assert_eq!(profile.peak_count.get(), 4);
    }
}
