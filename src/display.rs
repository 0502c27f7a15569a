//! Display utilities for terminal output.
//!
//! Month grids are drawn with one character per day, weekdays as rows and
//! weeks as columns. Cells use either level glyphs or 24-bit ANSI colour
//! taken from the resolved [`CellColor`].
//!
//! # Functions
//!
//! - [`level_glyph`] - Character for one intensity level
//! - [`render_month`] / [`render_heatmap`] - Draw grids as text
//! - [`make_bar`] - Create visual bar charts for relative values
//! - [`print_section_simple`] - Print section headers
//! - [`display_summary`] - Display an activity summary

use std::fmt::Write as _;

use crate::analytics::ActivitySummary;
use crate::color::CellColor;
use crate::grid::GridCell;
use crate::heatmap::{Heatmap, HeatmapMonth};
use crate::types::{ActivityCount, Level};

/// Glyphs for levels 0 through 4.
pub const LEVEL_GLYPHS: [char; Level::COUNT] = ['·', '░', '▒', '▓', '█'];

/// Glyph drawn for padding cells.
pub const PADDING_GLYPH: char = ' ';

/// How cells are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellStyle {
    /// Level glyphs only
    #[default]
    Glyphs,
    /// Full block in the cell colour
    TrueColor,
}

/// Character for a level.
///
/// # Examples
///
/// ```
/// use activity_heatmap::display::level_glyph;
/// use activity_heatmap::Level;
///
/// assert_eq!(level_glyph(Level::NONE), '·');
/// assert_eq!(level_glyph(Level::MAX), '█');
/// ```
#[must_use]
pub fn level_glyph(level: Level) -> char {
    LEVEL_GLYPHS
        .get(level.index())
        .copied()
        .unwrap_or(LEVEL_GLYPHS[Level::COUNT - 1])
}

fn render_cell(out: &mut String, cell: &GridCell, color: CellColor, style: CellStyle) {
    let Some(day) = cell.day() else {
        out.push(PADDING_GLYPH);
        return;
    };
    match (style, color.rgb()) {
        (CellStyle::TrueColor, Some(rgb)) => {
            let _ = write!(out, "\x1b[38;2;{};{};{}m█\x1b[0m", rgb.r, rgb.g, rgb.b);
        }
        _ => out.push(level_glyph(day.level)),
    }
}

/// Draw one painted month: a title line, then one row per weekday.
#[must_use]
pub fn render_month(month: &HeatmapMonth, style: CellStyle) -> String {
    let grid = &month.grid;
    let labels = grid.weekday_labels();
    let mut out = format!("{}\n", month.range());

    for (slot, label) in labels.iter().enumerate() {
        out.push_str(label);
        for week in 0..grid.num_weeks() {
            out.push(' ');
            match month.painted(week, slot) {
                Some((cell, color)) => render_cell(&mut out, cell, color, style),
                None => out.push(PADDING_GLYPH),
            }
        }
        out.push('\n');
    }
    out
}

/// Draw every month of a heatmap, oldest first, followed by a legend.
#[must_use]
pub fn render_heatmap(heatmap: &Heatmap, style: CellStyle) -> String {
    let mut out = String::new();
    for month in &heatmap.months {
        out.push_str(&render_month(month, style));
        out.push('\n');
    }
    out.push_str("Less ");
    for level in Level::all() {
        out.push(level_glyph(level));
    }
    out.push_str(" More\n");
    out
}

/// Create a visual bar for displaying relative values.
///
/// Uses Unicode block characters to create a proportional bar chart.
///
/// # Arguments
///
/// * `value` - The value to represent
/// * `max_value` - The maximum value (determines 100% width)
/// * `width` - The total width of the bar in characters
///
/// # Examples
///
/// ```
/// use activity_heatmap::display::make_bar;
/// use activity_heatmap::ActivityCount;
///
/// let bar = make_bar(ActivityCount::new(50), ActivityCount::new(100), 10);
/// assert_eq!(bar, "█████░░░░░");
///
/// // Nothing to scale against
/// assert_eq!(make_bar(ActivityCount::new(3), ActivityCount::ZERO, 4), "    ");
/// ```
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn make_bar(value: ActivityCount, max_value: ActivityCount, width: usize) -> String {
    if max_value.is_zero() || value.is_zero() {
        return " ".repeat(width);
    }
    let ratio = (value.as_f64() / max_value.as_f64()).clamp(0.0, 1.0);
    let filled = (ratio * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Print a simple section header with dashes.
pub fn print_section_simple(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(30));
}

/// Format an activity summary.
#[must_use]
pub fn format_summary(summary: &ActivitySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Total activity:   {:>10}", summary.total);
    let _ = writeln!(out, "  Active days:      {:>10}", summary.active_days);
    let _ = writeln!(
        out,
        "  Per active day:   {:>10.1}",
        summary.mean_per_active_day()
    );
    if let Some(busiest) = summary.busiest_day {
        let _ = writeln!(
            out,
            "  Busiest day:      {:>10} ({})",
            busiest.key(),
            busiest.count
        );
    }
    if let (Some(first), Some(last)) = (summary.first_day, summary.last_day) {
        let _ = writeln!(out, "  Recorded:         {first} to {last}");
    }

    let streaks = &summary.streaks;
    let _ = writeln!(out, "  Current streak:   {:>10} days", streaks.current_streak);
    let _ = write!(out, "  Longest streak:   {:>10} days", streaks.longest_streak);
    if let (Some(start), Some(end)) = (streaks.longest_streak_start, streaks.longest_streak_end) {
        let _ = write!(out, " ({start} to {end})");
    }
    out.push('\n');
    out
}

/// Format the weekday profile as bars, Monday first.
#[must_use]
pub fn format_weekdays(summary: &ActivitySummary) -> String {
    const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let profile = &summary.weekdays;
    let mut out = String::new();
    for (name, total) in NAMES.iter().zip(profile.totals) {
        let bar = make_bar(total, profile.peak_count, 20);
        let _ = writeln!(out, "  {name} {bar} {total:>6}");
    }
    out
}

/// Display an activity summary.
pub fn display_summary(summary: &ActivitySummary) {
    print!("{}", format_summary(summary));
    if !summary.total.is_zero() {
        print_section_simple("By weekday");
        print!("{}", format_weekdays(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::summarize;
    use crate::bucket::ActivityMap;
    use crate::config::HeatmapConfig;
    use crate::grid::DAYS_PER_WEEK;
    use chrono::NaiveDate;

    fn c(n: u64) -> ActivityCount {
        ActivityCount::new(n)
    }

    fn september() -> Heatmap {
        let activities = ActivityMap::from_day_counts([("2025-09-01", 9u64), ("2025-09-02", 3)])
            .activities;
        let config = HeatmapConfig {
            months_to_show: 1,
            ..HeatmapConfig::default()
        };
        let today = NaiveDate::from_ymd_opt(2025, 9, 14).unwrap();
        Heatmap::from_activities(&activities, today, &config).unwrap()
    }

    #[test]
    fn test_level_glyphs() {
        assert_eq!(level_glyph(Level::NONE), '·');
        assert_eq!(level_glyph(Level::MAX), '█');
    }

    #[test]
    fn test_render_month_layout() {
        let heatmap = september();
        let text = render_month(&heatmap.months[0], CellStyle::Glyphs);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "September 2025");
        assert_eq!(lines.len(), 1 + DAYS_PER_WEEK);

        // Sunday row starts with padding, Monday row starts with Sept 1 (9 → level 4)
        assert!(lines[1].starts_with("S  "));
        assert!(lines[2].starts_with("M █"));
        // Sept 2 has 3 → level 2
        assert!(lines[3].starts_with("T ▒"));
        // every row has the same number of week columns
        let widths: Vec<usize> = lines[1..].iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_truecolor_uses_cell_colour() {
        let heatmap = september();
        let text = render_month(&heatmap.months[0], CellStyle::TrueColor);
        assert!(text.contains("\x1b[38;2;"));
        assert!(text.contains("\x1b[0m"));
    }

    #[test]
    fn test_render_heatmap_legend() {
        let text = render_heatmap(&september(), CellStyle::Glyphs);
        assert!(text.ends_with("Less ·░▒▓█ More\n"));
    }

    #[test]
    fn test_make_bar_full() {
        assert_eq!(make_bar(c(100), c(100), 10), "██████████");
    }

    #[test]
    fn test_make_bar_half() {
        assert_eq!(make_bar(c(50), c(100), 10), "█████░░░░░");
    }

    #[test]
    fn test_make_bar_zero_max() {
        assert_eq!(make_bar(c(50), c(0), 10), "          ");
    }

    #[test]
    fn test_format_summary() {
        let activities = ActivityMap::from_day_counts([("2025-09-01", 2u64), ("2025-09-02", 4)])
            .activities;
        let summary = summarize(&activities, NaiveDate::from_ymd_opt(2025, 9, 3).unwrap());
        let text = format_summary(&summary);
        assert!(text.contains("Total activity:            6"));
        assert!(text.contains("Busiest day:      2025-09-02 (4)"));
        assert!(text.contains("Longest streak:            2 days (2025-09-01 to 2025-09-02)"));

        let weekdays = format_weekdays(&summary);
        assert_eq!(weekdays.lines().count(), 7);
        assert!(weekdays.lines().nth(1).unwrap().contains(&"█".repeat(20)));
    }
}
