//! The heatmap pipeline: records → day buckets → levels → month grids → colours.
//!
//! Everything is recomputed from the input snapshot on each call. The result
//! carries resolved colours for every cell plus the cell geometry, so a
//! renderer only draws and reports taps.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::bucket::{bucket_with_report, ActivityMap, Dated};
use crate::color::{CellColor, ColorScheme};
use crate::config::HeatmapConfig;
use crate::date_range::MonthRange;
use crate::error::Result;
use crate::grid::{DayCell, GridCell, MonthGrid, MonthGridBuilder, DAYS_PER_WEEK};
use crate::level::{Classifier, MaxScope};
use crate::types::ActivityCount;

/// What the rendering layer reports back when a day is tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTap {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: ActivityCount,
}

/// Cell geometry shared by every month of a heatmap.
///
/// Weeks run along x, weekday slots along y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellLayout {
    pub cell_size: f64,
    pub cell_spacing: f64,
}

impl CellLayout {
    #[must_use]
    pub const fn new(cell_size: f64, cell_spacing: f64) -> Self {
        Self {
            cell_size,
            cell_spacing,
        }
    }

    /// Distance from one cell's origin to the next.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.cell_spacing
    }

    /// Top-left corner of a cell.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_origin(&self, week: usize, slot: usize) -> (f64, f64) {
        (week as f64 * self.pitch(), slot as f64 * self.pitch())
    }

    /// Width and height of a month with `weeks` columns.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn month_size(&self, weeks: usize) -> (f64, f64) {
        let span = |n: usize| {
            if n == 0 {
                0.0
            } else {
                n as f64 * self.pitch() - self.cell_spacing
            }
        };
        (span(weeks), span(DAYS_PER_WEEK))
    }

    /// Which `(week, slot)` a point falls in. Points in the gaps between
    /// cells, or outside the grid, hit nothing.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell_at(&self, x: f64, y: f64, weeks: usize) -> Option<(usize, usize)> {
        let pitch = self.pitch();
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 || pitch <= 0.0 {
            return None;
        }
        let axis = |v: f64, limit: usize| {
            let index = (v / pitch).floor();
            let within = v - index * pitch;
            let index = index as usize;
            (index < limit && within < self.cell_size).then_some(index)
        };
        Some((axis(x, weeks)?, axis(y, DAYS_PER_WEEK)?))
    }
}

/// One rendered month: its grid, the maximum it was scaled against, and the
/// colour of every cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMonth {
    pub grid: MonthGrid,
    pub scope_max: ActivityCount,
    pub colors: Vec<[CellColor; DAYS_PER_WEEK]>,
}

impl HeatmapMonth {
    /// Resolve colours for every cell of `grid`.
    #[must_use]
    pub fn paint(grid: MonthGrid, scope_max: ActivityCount, scheme: &ColorScheme) -> Self {
        let colors = grid
            .weeks
            .iter()
            .map(|week| {
                week.map(|cell| match cell {
                    GridCell::Empty => CellColor::Transparent,
                    GridCell::Day(day) => scheme.paint(day.count, day.level, scope_max),
                })
            })
            .collect();
        Self {
            grid,
            scope_max,
            colors,
        }
    }

    #[must_use]
    pub const fn range(&self) -> &MonthRange {
        &self.grid.range
    }

    /// Cell and colour at a position.
    #[must_use]
    pub fn painted(&self, week: usize, slot: usize) -> Option<(&GridCell, CellColor)> {
        let cell = self.grid.cell(week, slot)?;
        let color = self.colors.get(week)?.get(slot).copied()?;
        Some((cell, color))
    }

    /// Tap payload for a position; `None` for padding.
    #[must_use]
    pub fn tap(&self, week: usize, slot: usize) -> Option<DayTap> {
        let day = self.grid.cell(week, slot)?.day()?;
        Some(DayTap {
            date: day.key(),
            count: day.count,
        })
    }
}

/// A complete multi-month heatmap ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    /// Months oldest first.
    pub months: Vec<HeatmapMonth>,
    pub layout: CellLayout,
    /// Input records dropped for unreadable dates.
    pub skipped: usize,
}

impl Heatmap {
    /// Run the whole pipeline over raw records.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidRange`] when the configured window is inverted.
    pub fn build<I>(records: I, today: NaiveDate, config: &HeatmapConfig) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Dated,
    {
        let bucketed = bucket_with_report(records);
        let mut heatmap = Self::from_activities(&bucketed.activities, today, config)?;
        heatmap.skipped = bucketed.skipped;
        Ok(heatmap)
    }

    /// Build from an already bucketed activity map.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidRange`] when the configured window is inverted.
    pub fn from_activities(
        activities: &ActivityMap,
        today: NaiveDate,
        config: &HeatmapConfig,
    ) -> Result<Self> {
        let window = config.window();
        let ranges = window.resolve(today, config.min_date)?;
        let builder = MonthGridBuilder::new(config.week_start);
        let overall_max = activities.max_count();

        let months: Vec<HeatmapMonth> = ranges
            .into_iter()
            .map(|range| {
                let scope_max = match config.max_scope {
                    MaxScope::Month => activities.max_in(range.start, range.end),
                    MaxScope::All => overall_max,
                };
                debug!("{} scaled against max {}", range, scope_max);
                let classifier = Classifier::new(config.level_policy, scope_max);
                let grid = builder.build_range(range, activities, &classifier);
                HeatmapMonth::paint(grid, scope_max, &config.colors)
            })
            .collect();

        info!(
            "built {} heatmap: {} months from {} active days",
            window,
            months.len(),
            activities.len()
        );

        Ok(Self {
            months,
            layout: CellLayout::new(config.cell_size, config.cell_spacing),
            skipped: 0,
        })
    }

    /// Every day cell across all months.
    pub fn days(&self) -> impl Iterator<Item = &DayCell> + '_ {
        self.months.iter().flat_map(|m| m.grid.days())
    }

    /// Which day, if any, lies under a point inside month `month`.
    #[must_use]
    pub fn hit(&self, month: usize, x: f64, y: f64) -> Option<DayTap> {
        let month = self.months.get(month)?;
        let (week, slot) = self.layout.cell_at(x, y, month.grid.num_weeks())?;
        month.tap(week, slot)
    }

    /// Deliver a press at `(x, y)` in month `month` to `on_day_press` as
    /// `(date, count)`. Returns whether a day was hit; padding and gaps are
    /// ignored.
    pub fn press<F>(&self, month: usize, x: f64, y: f64, on_day_press: F) -> bool
    where
        F: FnOnce(&str, ActivityCount),
    {
        match self.hit(month, x, y) {
            Some(tap) => {
                on_day_press(&tap.date, tap.count);
                true
            }
            None => false,
        }
    }
}
