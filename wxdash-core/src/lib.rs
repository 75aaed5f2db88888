//! Core library for the `wxdash` weather dashboard.
//!
//! This crate defines:
//! - The OpenWeather client and its error taxonomy
//! - Forecast aggregation into daily summaries
//! - The append-only lookup history, its CSV export and per-city summary
//! - Configuration & theme settings
//!
//! It is used by `wxdash-cli`, but can also be reused by other front ends.

pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod history;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod settings;
pub mod summary;

pub use compare::CityComparison;
pub use config::Config;
pub use error::{HistoryError, WeatherError};
pub use export::{ExportFilter, ExportSummary, HistoryExporter};
pub use forecast::{aggregate, upcoming_days};
pub use history::{HistoryRecord, HistoryScan, HistoryStore};
pub use lookup::{CachePolicy, Source, lookup_current};
pub use model::{DailyForecast, ForecastEntry, TemperatureUnit, WeatherObservation};
pub use provider::{WeatherProvider, provider_from_config};
pub use settings::Settings;
pub use summary::{CitySummary, summarize};
