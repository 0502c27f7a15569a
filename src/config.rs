//! Configuration management for activity-heatmap

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::color::ColorScheme;
use crate::date_range::DateWindow;
use crate::error::{Error, Result};
use crate::level::{LevelPolicy, MaxScope};

pub use crate::date_range::MAX_MONTHS_TO_SHOW;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Heatmap layout and colouring
    pub heatmap: HeatmapConfig,

    /// Nearby-place ranking
    pub geo: GeoConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Heatmap settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// How many recent months to show, current month included
    pub months_to_show: u32,

    /// Show the 365 days ending today instead of recent months
    pub trailing_year: bool,

    /// Explicit `[start, end]` window; overrides the two settings above
    pub span: Option<(NaiveDate, NaiveDate)>,

    /// Earliest day ever shown, e.g. the user's registration date
    pub min_date: Option<NaiveDate>,

    /// First day of each week column ("Sun", "Mon", ...)
    pub week_start: Weekday,

    /// Fixed thresholds or max-normalised levels
    pub level_policy: LevelPolicy,

    /// Scale each month on its own or against the whole data set
    pub max_scope: MaxScope,

    /// Width and height of one cell
    pub cell_size: f64,

    /// Gap between cells
    pub cell_spacing: f64,

    /// Cell colours
    pub colors: ColorScheme,
}

/// Nearby-place ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Places farther than this are dropped
    pub search_radius_km: f64,

    /// Maximum number of places returned
    pub max_results: usize,

    /// Minimum gap between place-search requests (e.g. "1s", "500ms")
    pub min_request_interval: String,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            months_to_show: 4,
            trailing_year: false,
            span: None,
            min_date: None,
            week_start: Weekday::Sun,
            level_policy: LevelPolicy::Fixed,
            max_scope: MaxScope::Month,
            cell_size: 12.0,
            cell_spacing: 4.0,
            colors: ColorScheme::default(),
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 10.0,
            max_results: 20,
            min_request_interval: "1s".to_string(),
        }
    }
}

impl HeatmapConfig {
    /// The window these settings describe.
    #[must_use]
    pub const fn window(&self) -> DateWindow {
        if let Some((start, end)) = self.span {
            DateWindow::Span { start, end }
        } else if self.trailing_year {
            DateWindow::TrailingYear
        } else {
            DateWindow::RecentMonths(self.months_to_show)
        }
    }
}

impl GeoConfig {
    /// Parsed minimum request interval.
    pub fn min_request_interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.min_request_interval).map_err(|e| {
            Error::config(format!(
                "min_request_interval '{}' is not a duration: {e}",
                self.min_request_interval
            ))
        })
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join(crate::APP_NAME).join("config.toml"))
    }

    /// Validate configuration values.
    ///
    /// Call this after loading to ensure all values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        let heatmap = &self.heatmap;

        if heatmap.months_to_show > MAX_MONTHS_TO_SHOW {
            return Err(Error::config(format!(
                "months_to_show should not exceed {MAX_MONTHS_TO_SHOW}, got {}",
                heatmap.months_to_show
            )));
        }

        if !(heatmap.cell_size.is_finite() && heatmap.cell_size > 0.0) {
            return Err(Error::config(format!(
                "cell_size must be positive, got {}",
                heatmap.cell_size
            )));
        }

        if !(heatmap.cell_spacing.is_finite() && heatmap.cell_spacing >= 0.0) {
            return Err(Error::config(format!(
                "cell_spacing must not be negative, got {}",
                heatmap.cell_spacing
            )));
        }

        if let Some((start, end)) = heatmap.span {
            if start > end {
                return Err(Error::config(format!(
                    "span start {start} is after span end {end}"
                )));
            }
        }

        if !(self.geo.search_radius_km.is_finite() && self.geo.search_radius_km > 0.0) {
            return Err(Error::config(format!(
                "search_radius_km must be positive, got {}",
                self.geo.search_radius_km
            )));
        }

        if self.geo.max_results == 0 {
            return Err(Error::config("max_results must be at least 1"));
        }

        self.geo.min_request_interval()?;

        // Validate log_level is a known level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        Ok(())
    }
}
