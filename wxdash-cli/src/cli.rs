use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use wxdash_core::{
    CachePolicy, CityComparison, Config, ExportFilter, HistoryExporter, HistoryStore, Settings,
    TemperatureUnit, aggregate, config::settings_file_path, lookup_current, provider_from_config,
    upcoming_days,
};

use crate::output;

/// Days shown by `forecast` unless told otherwise.
const FORECAST_DAYS: usize = 5;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxdash", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Log requests and history scans to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key and default temperature unit.
    Configure,

    /// Show current conditions for a city.
    Current {
        city: String,

        /// Temperature unit, F or C.
        #[arg(long, short)]
        unit: Option<TemperatureUnit>,

        /// Ignore today's recorded lookup and ask the service again.
        #[arg(long)]
        fresh: bool,
    },

    /// Show the daily forecast for a city.
    Forecast {
        city: String,

        #[arg(long, short)]
        unit: Option<TemperatureUnit>,

        #[arg(long, default_value_t = FORECAST_DAYS)]
        days: usize,
    },

    /// Compare current conditions in two cities.
    Compare {
        first: String,
        second: String,

        #[arg(long, short)]
        unit: Option<TemperatureUnit>,
    },

    /// Show the first recorded lookup for a city on a date.
    History {
        city: String,

        /// YYYY-MM-DD; defaults to today.
        #[arg(long)]
        date: Option<String>,

        #[arg(long, short)]
        unit: Option<TemperatureUnit>,
    },

    /// Summarise recorded temperatures per city.
    Stats {
        #[arg(long, short)]
        unit: Option<TemperatureUnit>,
    },

    /// Export the lookup history as CSV.
    Export {
        /// Output file; defaults to weather_history_<timestamp>.csv.
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, short)]
        unit: Option<TemperatureUnit>,

        /// Only cities containing this text (case-insensitive).
        #[arg(long)]
        city: Option<String>,

        /// Only records for this exact date.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show or change the dashboard theme.
    Theme {
        /// Theme key to switch to; omit to list themes.
        key: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Theme { key } => theme(key.as_deref()),
            Command::Current { city, unit, fresh } => {
                let (config, store) = load()?;
                let provider = provider_from_config(&config)?;
                let policy = if fresh { CachePolicy::Refresh } else { CachePolicy::PreferHistory };
                let (obs, source) =
                    lookup_current(&*provider, &store, city.trim(), &today(), policy)
                        .await?;
                output::print_observation(&obs, unit.unwrap_or(config.default_unit), Some(source));
                Ok(())
            }
            Command::Forecast { city, unit, days } => {
                let (config, _) = load()?;
                let provider = provider_from_config(&config)?;
                let entries = provider.fetch_forecast(city.trim()).await?;
                let daily = upcoming_days(&aggregate(&entries), &today(), days);
                output::print_forecast(city.trim(), &daily, unit.unwrap_or(config.default_unit));
                Ok(())
            }
            Command::Compare { first, second, unit } => {
                let (config, _) = load()?;
                let provider = provider_from_config(&config)?;
                let a = provider.fetch_current(first.trim()).await?;
                let b = provider.fetch_current(second.trim()).await?;
                output::print_comparison(
                    &CityComparison::new(a, b),
                    unit.unwrap_or(config.default_unit),
                );
                Ok(())
            }
            Command::History { city, date, unit } => {
                let (config, store) = load()?;
                let city = city.trim();
                let date = date.unwrap_or_else(today);
                match store.lookup(city, &date)? {
                    Some(obs) => {
                        output::print_observation(&obs, unit.unwrap_or(config.default_unit), None)
                    }
                    None => println!("No recorded lookup for {city} on {date}."),
                }
                Ok(())
            }
            Command::Stats { unit } => {
                let (config, store) = load()?;
                output::print_summary(&store.summary()?, unit.unwrap_or(config.default_unit));
                Ok(())
            }
            Command::Export { output: dest, unit, city, date } => {
                let (config, store) = load()?;
                let filter = ExportFilter { city, date };
                let summary = HistoryExporter::new(&store).export_filtered(
                    dest.as_deref(),
                    unit.unwrap_or(config.default_unit),
                    &filter,
                )?;
                output::print_export(&summary);
                Ok(())
            }
        }
    }
}

fn load() -> Result<(Config, HistoryStore)> {
    let config = Config::load()?;
    let store = HistoryStore::new(config.history_path()?);
    Ok((config, store))
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn configure() -> Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt was cancelled")?;
    config.set_api_key(api_key);

    let start = match config.default_unit {
        TemperatureUnit::Fahrenheit => 0,
        TemperatureUnit::Celsius => 1,
    };
    let unit = Select::new("Default temperature unit:", vec!["F", "C"])
        .with_starting_cursor(start)
        .prompt()
        .context("Unit prompt was cancelled")?;
    config.default_unit = unit.parse().map_err(anyhow::Error::msg)?;

    config.save_to(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn theme(key: Option<&str>) -> Result<()> {
    let path = settings_file_path()?;
    let mut settings = Settings::load_from(&path);

    match key {
        Some(key) => {
            settings.set_theme(key)?;
            settings.save_to(&path)?;
            println!("Theme set to {key}.");
        }
        None => output::print_themes(&settings.theme),
    }

    Ok(())
}
