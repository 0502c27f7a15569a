//! Month grids: calendar days laid out in week columns of seven slots.
//!
//! Slot 0 of each week is the configured start of week. The first week is
//! padded with empty cells up to the first day shown, and the last week is
//! padded out to seven, so the total cell count is always a multiple of 7.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::bucket::{day_key, ActivityMap};
use crate::date_range::MonthRange;
use crate::error::Result;
use crate::level::Classifier;
use crate::types::{ActivityCount, Level};

/// Days per week column.
pub const DAYS_PER_WEEK: usize = 7;

/// One day with its activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub count: ActivityCount,
    pub level: Level,
}

impl DayCell {
    /// Canonical `YYYY-MM-DD` key of the day.
    #[must_use]
    pub fn key(&self) -> String {
        day_key(self.date)
    }
}

/// A grid slot: padding or a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridCell {
    /// Alignment padding; carries no count or level.
    Empty,
    Day(DayCell),
}

impl GridCell {
    #[must_use]
    pub const fn day(&self) -> Option<&DayCell> {
        match self {
            Self::Day(day) => Some(day),
            Self::Empty => None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// One week column.
pub type Week = [GridCell; DAYS_PER_WEEK];

/// Position of `day` within a week starting on `week_start` (0-6).
#[must_use]
pub fn weekday_offset(day: Weekday, week_start: Weekday) -> usize {
    let day = day.num_days_from_sunday();
    let start = week_start.num_days_from_sunday();
    ((day + 7 - start) % 7) as usize
}

/// A month (or clipped part of one) laid out week-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub range: MonthRange,
    #[serde(skip)]
    pub week_start: Weekday,
    pub weeks: Vec<Week>,
}

impl MonthGrid {
    #[must_use]
    pub fn num_weeks(&self) -> usize {
        self.weeks.len()
    }

    /// Every cell, week by week.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.weeks.iter().flatten()
    }

    /// Day cells only, ascending by date.
    pub fn days(&self) -> impl Iterator<Item = &DayCell> + '_ {
        self.cells().filter_map(GridCell::day)
    }

    /// Empty cells before the first day.
    #[must_use]
    pub fn leading_padding(&self) -> usize {
        self.cells().take_while(|c| c.is_empty()).count()
    }

    /// Empty cells after the last day.
    #[must_use]
    pub fn trailing_padding(&self) -> usize {
        self.weeks
            .iter()
            .rev()
            .flat_map(|week| week.iter().rev())
            .take_while(|c| c.is_empty())
            .count()
    }

    /// Cell at a week column and weekday slot.
    #[must_use]
    pub fn cell(&self, week: usize, slot: usize) -> Option<&GridCell> {
        self.weeks.get(week).and_then(|w| w.get(slot))
    }

    /// Week column and slot of a date, if it is shown.
    #[must_use]
    pub fn position_of(&self, date: NaiveDate) -> Option<(usize, usize)> {
        self.weeks.iter().enumerate().find_map(|(wi, week)| {
            week.iter()
                .position(|c| c.day().is_some_and(|d| d.date == date))
                .map(|slot| (wi, slot))
        })
    }

    /// One weekday across every week, for row-major renderers.
    pub fn weekday_row(&self, slot: usize) -> impl Iterator<Item = &GridCell> + '_ {
        self.weeks.iter().filter_map(move |w| w.get(slot))
    }

    /// Weekday shown in a slot.
    #[must_use]
    pub fn slot_weekday(&self, slot: usize) -> Weekday {
        let mut day = self.week_start;
        for _ in 0..slot % DAYS_PER_WEEK {
            day = day.succ();
        }
        day
    }

    /// Single-letter weekday labels in slot order.
    #[must_use]
    pub fn weekday_labels(&self) -> [&'static str; DAYS_PER_WEEK] {
        let mut labels = [""; DAYS_PER_WEEK];
        for (slot, label) in labels.iter_mut().enumerate() {
            *label = match self.slot_weekday(slot) {
                Weekday::Sun | Weekday::Sat => "S",
                Weekday::Mon => "M",
                Weekday::Tue | Weekday::Thu => "T",
                Weekday::Wed => "W",
                Weekday::Fri => "F",
            };
        }
        labels
    }

    /// Largest count among the days shown.
    #[must_use]
    pub fn max_count(&self) -> ActivityCount {
        self.days().map(|d| d.count).max().unwrap_or_default()
    }
}

/// Lays out month grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGridBuilder {
    pub week_start: Weekday,
}

impl Default for MonthGridBuilder {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
        }
    }
}

impl MonthGridBuilder {
    #[must_use]
    pub const fn new(week_start: Weekday) -> Self {
        Self { week_start }
    }

    /// Grid for a full calendar month.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidMonth`] when `month` is not 1-12 or the year is
    /// out of range.
    pub fn build_month(
        &self,
        year: i32,
        month: u32,
        activities: &ActivityMap,
        classifier: &Classifier,
    ) -> Result<MonthGrid> {
        let range = MonthRange::full(year, month)?;
        Ok(self.build_range(range, activities, classifier))
    }

    /// Grid for a (possibly clipped) month range. Days missing from
    /// `activities` get a count and level of zero.
    #[must_use]
    pub fn build_range(
        &self,
        range: MonthRange,
        activities: &ActivityMap,
        classifier: &Classifier,
    ) -> MonthGrid {
        let leading = weekday_offset(range.start.weekday(), self.week_start);
        let mut cells: Vec<GridCell> = Vec::with_capacity(leading + 31 + DAYS_PER_WEEK);
        cells.resize(leading, GridCell::Empty);

        for date in range.days() {
            let count = activities.count_on(date);
            cells.push(GridCell::Day(DayCell {
                date,
                count,
                level: classifier.classify(count),
            }));
        }

        let remainder = cells.len() % DAYS_PER_WEEK;
        if remainder != 0 {
            cells.resize(cells.len() + DAYS_PER_WEEK - remainder, GridCell::Empty);
        }

        let weeks = cells
            .chunks_exact(DAYS_PER_WEEK)
            .filter_map(|chunk| Week::try_from(chunk).ok())
            .collect();

        MonthGrid {
            range,
            week_start: self.week_start,
            weeks,
        }
    }
}
