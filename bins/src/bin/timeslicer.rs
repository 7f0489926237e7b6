// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The TimeSlicer command line tool
//!

use chrono::NaiveDate;
use clap::{Parser, ValueEnum, builder::PossibleValue};
use serde_json::json;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::fs;
use std::path::PathBuf;
use timeslicer_core::{GranularityType, RawDateValue, TimelineSettings};
use timeslicer_engine::{Engine, date_range_text};

#[macro_use]
extern crate log;
extern crate simplelog;

/// TimeSlicer entry point
///
/// One of:
/// - Print the periods of a granularity
/// - Print the label rows of a granularity
/// - Print the selection of a date range
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    // Setup logging
    let config_log = ConfigBuilder::new()
        .add_filter_allow_str("timeslicer")
        .build();
    CombinedLogger::init(vec![TermLogger::new(
        args.log_level,
        config_log,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )])?;

    // Settings
    let mut settings = match &args.config {
        Some(path) => TimelineSettings::load(path)?,
        None => TimelineSettings::default(),
    };
    if let Some(granularity) = args.granularity {
        settings.granularity = GranularityType::try_from(granularity)?;
    }

    // Dates
    let json = fs::read_to_string(&args.dates)?;
    let values: Vec<RawDateValue> = serde_json::from_str(&json)?;
    info!("Read {} raw values from {}", values.len(), args.dates.display());

    let mut engine = Engine::new(settings);
    engine.set_values(&values);
    if let Some(start) = args.start {
        // An empty range is widened to the start day
        let end = args.end.unwrap_or(start);
        engine.set_selection_dates(start, end);
    }

    let output = match args.cli_command {
        Command::Periods => json!({
            "granularity": engine.current_granularity(),
            "periods": engine
                .periods()
                .iter()
                .map(|period| json!({
                    "period": period,
                    "text": date_range_text(period),
                }))
                .collect::<Vec<_>>(),
        }),
        Command::Labels => json!({
            "granularity": engine.current_granularity(),
            "labels": engine.labels(),
        }),
        Command::Select => {
            let dates = engine.selection_dates();
            json!({
                "granularity": engine.current_granularity(),
                "start": dates.map(|(start, _)| start),
                "end": dates.map(|(_, end)| end),
                "selection": engine.selection(),
                "cursor_positions": engine.cursor_positions(args.cell_width),
                "text": engine.time_range_text(),
            })
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// TimeSlicer CLI args using [clap]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "TimeSlicer tool for inspecting granularities & selections",
    after_help = "The dates file holds a JSON array of dates, epoch milliseconds or years"
)]
pub struct Cli {
    // What to print
    #[arg(value_enum)]
    pub cli_command: Command,

    /// Path to the JSON array of raw date values
    #[arg(long)]
    pub dates: PathBuf,

    /// Path to the JSON settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Granularity (0 = year, 1 = quarter, 2 = month, 3 = week, 4 = day)
    #[arg(long)]
    pub granularity: Option<i64>,

    /// First selected date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Day after the last selected date (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Width of one whole period, for cursor positions
    #[arg(long, default_value_t = 1.0)]
    pub cell_width: f64,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::Warn)]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone)]
pub enum Command {
    Periods,
    Labels,
    Select,
}

impl ValueEnum for Command {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Periods, Self::Labels, Self::Select]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Command::Periods => {
                Some(PossibleValue::new("periods").help("Print the periods of the granularity"))
            }
            Command::Labels => Some(
                PossibleValue::new("labels").help("Print the label rows of the granularity"),
            ),
            Command::Select => Some(
                PossibleValue::new("select")
                    .help("Print the selection (the whole extent unless --start is given)"),
            ),
        }
    }
}
