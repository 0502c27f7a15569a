//! Activity Heatmap - Main entry point
//!
//! CLI over the library: render heatmaps, bucket records, print summaries.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use activity_heatmap::{
    analytics::summarize,
    bucket::{ActivityInput, Bucketed},
    color::ColorMode,
    config::Config,
    display::{self, CellStyle},
    error::Result,
    geo::{haversine_km, Coordinate},
    level::{LevelPolicy, MaxScope},
    Heatmap,
};

#[derive(Parser)]
#[command(name = "activity-heatmap")]
#[command(author, version, about = "Calendar activity heatmaps from dated records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ACTIVITY_HEATMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the heatmap for a records file
    Render {
        /// JSON file of records, timestamps or day counts
        input: PathBuf,

        /// Number of recent months to show
        #[arg(short, long)]
        months: Option<u32>,

        /// Earliest day to show (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Render as of this day instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// First day of the week
        #[arg(long, value_enum)]
        week_start: Option<WeekStart>,

        /// Level policy
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Scale every month against the whole data set
        #[arg(long)]
        global_max: bool,

        /// Show the past 365 days instead of recent months
        #[arg(long)]
        year_window: bool,

        /// Use palette colours instead of the gradient
        #[arg(long)]
        palette: bool,

        /// Draw cells in 24-bit colour
        #[arg(long)]
        color: bool,

        /// Print the painted grids as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print per-day counts as JSON
    Bucket {
        /// JSON file of records, timestamps or day counts
        input: PathBuf,
    },

    /// Show totals and streaks
    Summary {
        /// JSON file of records, timestamps or day counts
        input: PathBuf,

        /// Compute streaks as of this day (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Great-circle distance between two points in km
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum WeekStart {
    Sun,
    Mon,
}

impl From<WeekStart> for Weekday {
    fn from(start: WeekStart) -> Self {
        match start {
            WeekStart::Sun => Self::Sun,
            WeekStart::Mon => Self::Mon,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fixed,
    Relative,
}

impl From<PolicyArg> for LevelPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Fixed => Self::Fixed,
            PolicyArg::Relative => Self::Relative,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration
    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    config.validate()?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.to_lowercase()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            input,
            months,
            since,
            today,
            week_start,
            policy,
            global_max,
            year_window,
            palette,
            color,
            json,
        } => {
            let mut config = config;
            let heatmap = &mut config.heatmap;
            if let Some(months) = months {
                heatmap.months_to_show = months;
            }
            if since.is_some() {
                heatmap.min_date = since;
            }
            if let Some(week_start) = week_start {
                heatmap.week_start = week_start.into();
            }
            if let Some(policy) = policy {
                heatmap.level_policy = policy.into();
            }
            if global_max {
                heatmap.max_scope = MaxScope::All;
            }
            if year_window {
                heatmap.trailing_year = true;
            }
            if palette {
                heatmap.colors.mode = ColorMode::Palette;
            }
            config.validate()?;

            let style = if color {
                CellStyle::TrueColor
            } else {
                CellStyle::Glyphs
            };
            run_render(&config, &input, today.unwrap_or_else(utc_today), style, json)
        }

        Commands::Bucket { input } => {
            let bucketed = read_input(&input)?;
            println!("{}", serde_json::to_string_pretty(&bucketed.activities)?);
            Ok(())
        }

        Commands::Summary { input, today } => {
            let bucketed = read_input(&input)?;
            let summary = summarize(&bucketed.activities, today.unwrap_or_else(utc_today));

            println!("\n{}", "=".repeat(50));
            println!("  ACTIVITY SUMMARY");
            println!("{}", "=".repeat(50));

            if summary.total.is_zero() {
                println!("\nNo activity found in {}.", input.display());
                return Ok(());
            }

            display::print_section_simple("OVERVIEW");
            display::display_summary(&summary);
            println!();
            Ok(())
        }

        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let a = Coordinate::new(lat1, lon1);
            let b = Coordinate::new(lat2, lon2);
            if !(a.is_valid() && b.is_valid()) {
                return Err(activity_heatmap::Error::other(format!(
                    "coordinates out of range: ({a}) to ({b})"
                )));
            }
            println!("{:.3} km", haversine_km(a, b));
            Ok(())
        }

        Commands::Config { show, init } => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

fn read_input(path: &Path) -> Result<Bucketed> {
    let contents = std::fs::read_to_string(path)?;
    let bucketed = ActivityInput::from_json(&contents)?.into_bucketed();
    info!(
        "read {} days from {} ({} skipped)",
        bucketed.activities.len(),
        path.display(),
        bucketed.skipped
    );
    Ok(bucketed)
}

fn run_render(
    config: &Config,
    input: &Path,
    today: NaiveDate,
    style: CellStyle,
    json: bool,
) -> Result<()> {
    let bucketed = read_input(input)?;
    let mut heatmap = Heatmap::from_activities(&bucketed.activities, today, &config.heatmap)?;
    heatmap.skipped = bucketed.skipped;

    if json {
        println!("{}", serde_json::to_string_pretty(&heatmap)?);
        return Ok(());
    }

    println!("{}\n", config.heatmap.window());
    print!("{}", display::render_heatmap(&heatmap, style));
    if heatmap.skipped > 0 {
        println!("\n{} records skipped (unreadable dates)", heatmap.skipped);
    }
    Ok(())
}
