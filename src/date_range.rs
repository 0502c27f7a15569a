//! Month ranges for partitioning a date span into per-month heatmaps.
//!
//! A `MonthRange` is one calendar month, possibly clipped at either end when
//! the requested window does not start or stop on a month boundary.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};

/// Length of the trailing-year window in days.
pub const TRAILING_YEAR_DAYS: u64 = 365;

/// Largest number of months a recent-months window may show.
pub const MAX_MONTHS_TO_SHOW: u32 = 24;

/// English name of a month (1-12).
#[must_use]
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map_or("?", |m| m.name())
}

/// First day of a month.
pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::InvalidMonth { year, month })
}

/// Last day of the month containing `date`.
#[must_use]
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        // only December of the final representable year has no successor month
        .unwrap_or(NaiveDate::MAX)
}

/// Number of days in a month, leap years included.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = first_of_month(year, month)?;
    Ok(last_of_month(first).day())
}

/// One calendar month's (possibly clipped) boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    /// Month label, e.g. "September".
    pub name: String,
    /// First day shown (inclusive).
    pub start: NaiveDate,
    /// Last day shown (inclusive).
    pub end: NaiveDate,
}

impl MonthRange {
    /// Range over `[start, end]`; both must lie in the same month.
    fn within_month(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: month_name(start.month()).to_string(),
            start,
            end,
        }
    }

    /// The full calendar month.
    pub fn full(year: i32, month: u32) -> Result<Self> {
        let start = first_of_month(year, month)?;
        Ok(Self::within_month(start, last_of_month(start)))
    }

    /// The full calendar month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        Self::within_month(start, last_of_month(start))
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Month number (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// Whether `date` is inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// Number of days in the range.
    #[must_use]
    pub fn num_days(&self) -> u32 {
        let days = (self.end - self.start).num_days() + 1;
        u32::try_from(days).unwrap_or(0)
    }

    /// Whether the range covers its whole calendar month.
    #[must_use]
    pub fn is_full_month(&self) -> bool {
        self.start.day() == 1 && self.end == last_of_month(self.start)
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Copy of this range starting no earlier than `min`, or `None` if the
    /// whole range is before `min`.
    #[must_use]
    pub fn clipped_to(&self, min: NaiveDate) -> Option<Self> {
        if self.end < min {
            None
        } else if self.start < min {
            Some(Self {
                start: min,
                ..self.clone()
            })
        } else {
            Some(self.clone())
        }
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.year())
    }
}

/// Partition `[start, end]` into consecutive months, oldest first.
///
/// The first range starts at `start` and the last ends at `end`; the months
/// between are full calendar months.
///
/// # Errors
///
/// [`Error::InvalidRange`] when `start > end`.
pub fn month_ranges(start: NaiveDate, end: NaiveDate) -> Result<Vec<MonthRange>> {
    if start > end {
        return Err(Error::InvalidRange { start, end });
    }

    let mut ranges = Vec::new();
    let mut cursor = start;
    loop {
        let month_end = last_of_month(cursor);
        let range_end = month_end.min(end);
        ranges.push(MonthRange::within_month(cursor, range_end));

        if range_end >= end {
            break;
        }
        match month_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    Ok(ranges)
}

/// The last `months_to_show` months up to and including the month of `today`,
/// oldest first.
///
/// The current month always runs to its last day, even past `today`. With
/// `min_date`, months before it are dropped and the month containing it starts
/// on it. If `min_date` is past the current month (or `months_to_show` is
/// zero) the whole current month is returned alone.
/// `months_to_show` is capped at [`MAX_MONTHS_TO_SHOW`].
#[must_use]
pub fn recent_months(
    today: NaiveDate,
    months_to_show: u32,
    min_date: Option<NaiveDate>,
) -> Vec<MonthRange> {
    let current = MonthRange::containing(today);
    if months_to_show == 0 {
        return vec![current];
    }

    let window_start = current
        .start
        .checked_sub_months(Months::new(months_to_show.min(MAX_MONTHS_TO_SHOW) - 1))
        .unwrap_or(NaiveDate::MIN);
    let start = min_date.map_or(window_start, |min| window_start.max(min));

    month_ranges(start, current.end).unwrap_or_else(|_| vec![current])
}

/// Drop ranges before `min_date`, clip the boundary month, and fall back to
/// the current month if nothing survives.
fn clip_with_fallback(
    ranges: Vec<MonthRange>,
    min_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<MonthRange> {
    let clipped: Vec<MonthRange> = match min_date {
        Some(min) => ranges.iter().filter_map(|r| r.clipped_to(min)).collect(),
        None => ranges,
    };
    if clipped.is_empty() {
        vec![MonthRange::containing(today)]
    } else {
        clipped
    }
}

/// The overall period a heatmap covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// The last N calendar months, current month included.
    RecentMonths(u32),
    /// The 365 days ending today.
    TrailingYear,
    /// An explicit inclusive span.
    Span { start: NaiveDate, end: NaiveDate },
}

impl DateWindow {
    /// Month ranges for this window, oldest first.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRange`] for a `Span` whose start is after its end.
    pub fn resolve(&self, today: NaiveDate, min_date: Option<NaiveDate>) -> Result<Vec<MonthRange>> {
        match *self {
            Self::RecentMonths(n) => Ok(recent_months(today, n, min_date)),
            Self::TrailingYear => {
                let start = today
                    .checked_sub_days(Days::new(TRAILING_YEAR_DAYS))
                    .unwrap_or(NaiveDate::MIN);
                let ranges = month_ranges(start, today)?;
                Ok(clip_with_fallback(ranges, min_date, today))
            }
            Self::Span { start, end } => {
                let ranges = month_ranges(start, end)?;
                Ok(clip_with_fallback(ranges, min_date, today))
            }
        }
    }

    /// Human-readable name for the window.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::RecentMonths(0 | 1) => "This Month".to_string(),
            Self::RecentMonths(n) => format!("Last {n} Months"),
            Self::TrailingYear => "Past Year".to_string(),
            Self::Span { start, end } => format!("{start} to {end}"),
        }
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::RecentMonths(4)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2025, 2).unwrap(), 28);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(2025, 12).unwrap(), 31);
        assert_eq!(days_in_month(2025, 9).unwrap(), 30);
    }

    #[test]
    fn test_invalid_month() {
        assert!(matches!(
            first_of_month(2025, 13),
            Err(Error::InvalidMonth { year: 2025, month: 13 })
        ));
        assert!(MonthRange::full(2025, 0).is_err());
        assert_eq!(month_name(13), "?");
    }

    #[test]
    fn test_full_month() {
        let range = MonthRange::full(2025, 9).unwrap();
        assert_eq!(range.name, "September");
        assert_eq!(range.start, date(2025, 9, 1));
        assert_eq!(range.end, date(2025, 9, 30));
        assert_eq!(range.num_days(), 30);
        assert_eq!(range.days().count(), 30);
        assert!(range.is_full_month());
        assert_eq!(range.to_string(), "September 2025");
    }

    #[test]
    fn test_month_ranges_clip_both_ends() {
        let ranges = month_ranges(date(2025, 7, 20), date(2025, 9, 10)).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].name, "July");
        assert_eq!(ranges[0].start, date(2025, 7, 20));
        assert_eq!(ranges[0].end, date(2025, 7, 31));
        assert!(ranges[1].is_full_month());
        assert_eq!(ranges[2].start, date(2025, 9, 1));
        assert_eq!(ranges[2].end, date(2025, 9, 10));
    }

    #[test]
    fn test_month_ranges_cover_every_day_once() {
        let start = date(2023, 11, 17);
        let end = date(2024, 3, 2);
        let ranges = month_ranges(start, end).unwrap();
        let days: Vec<NaiveDate> = ranges.iter().flat_map(|r| r.days().collect::<Vec<_>>()).collect();
        let expected: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn test_month_ranges_single_day_and_year_boundary() {
        let ranges = month_ranges(date(2025, 1, 1), date(2025, 1, 1)).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].num_days(), 1);

        let ranges = month_ranges(date(2024, 12, 31), date(2025, 1, 1)).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].name, "December");
        assert_eq!(ranges[1].name, "January");
    }

    #[test]
    fn test_month_ranges_invalid() {
        let err = month_ranges(date(2025, 9, 2), date(2025, 9, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
        assert!(err.to_string().contains("2025-09-02"));
    }

    #[test]
    fn test_recent_months_with_registration() {
        let months = recent_months(date(2025, 9, 14), 4, Some(date(2025, 8, 15)));
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].name, "August");
        assert_eq!(months[0].start, date(2025, 8, 15));
        assert_eq!(months[0].end, date(2025, 8, 31));
        assert_eq!(months[1].name, "September");
        assert!(months[1].is_full_month());
    }

    #[test]
    fn test_recent_months_without_registration() {
        let months = recent_months(date(2025, 2, 3), 4, None);
        let names: Vec<&str> = months.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["November", "December", "January", "February"]);
        assert!(months.iter().all(MonthRange::is_full_month));
        assert_eq!(months[0].year(), 2024);
    }

    #[test]
    fn test_recent_months_fallbacks() {
        let today = date(2025, 9, 14);
        let current = MonthRange::containing(today);

        assert_eq!(recent_months(today, 0, None), vec![current.clone()]);
        // registered after the current month
        assert_eq!(recent_months(today, 4, Some(date(2025, 11, 1))), vec![current]);

        // registered this month
        let months = recent_months(today, 4, Some(date(2025, 9, 10)));
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].start, date(2025, 9, 10));
    }

    #[test]
    fn test_recent_months_min_date_later_this_month() {
        let today = date(2025, 9, 14);
        let months = recent_months(today, 4, Some(date(2025, 9, 20)));
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].start, date(2025, 9, 20));
        assert_eq!(months[0].end, date(2025, 9, 30));

        let months = recent_months(today, 4, Some(date(2025, 10, 5)));
        assert_eq!(months, vec![MonthRange::containing(today)]);
        assert_eq!(months[0].start, date(2025, 9, 1));
    }

    #[test]
    fn test_recent_months_capped() {
        let today = date(2025, 9, 14);
        let months = recent_months(today, 10_000, None);
        assert_eq!(months.len(), MAX_MONTHS_TO_SHOW as usize);
        assert_eq!(months[0].start, date(2023, 10, 1));
        assert_eq!(months.last(), Some(&MonthRange::containing(today)));
        assert_eq!(recent_months(today, u32::MAX, None), months);
    }

    #[test]
    fn test_trailing_year_window() {
        let today = date(2025, 9, 14);
        let months = DateWindow::TrailingYear.resolve(today, None).unwrap();
        assert_eq!(months.len(), 13);
        assert_eq!(months[0].start, date(2024, 9, 14));
        assert_eq!(months[12].end, today);

        let months = DateWindow::TrailingYear
            .resolve(today, Some(date(2025, 6, 2)))
            .unwrap();
        assert_eq!(months.len(), 4);
        assert_eq!(months[0].start, date(2025, 6, 2));
    }

    #[test]
    fn test_span_window() {
        let today = date(2025, 9, 14);
        let window = DateWindow::Span {
            start: date(2025, 1, 1),
            end: date(2025, 3, 31),
        };
        assert_eq!(window.resolve(today, None).unwrap().len(), 3);
        // everything before registration: current month fallback
        let months = window.resolve(today, Some(date(2025, 5, 1))).unwrap();
        assert_eq!(months, vec![MonthRange::containing(today)]);

        let inverted = DateWindow::Span {
            start: date(2025, 3, 1),
            end: date(2025, 1, 1),
        };
        assert!(inverted.resolve(today, None).is_err());
    }

    #[test]
    fn test_window_display_names() {
        assert_eq!(DateWindow::RecentMonths(1).display_name(), "This Month");
        assert_eq!(DateWindow::default().display_name(), "Last 4 Months");
        assert_eq!(DateWindow::TrailingYear.to_string(), "Past Year");
    }
}
