use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, WeatherError,
    model::{ForecastEntry, WeatherObservation},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// A remote source of current conditions and 3-hour forecasts.
///
/// Implementations do no caching; callers that want it go through
/// [`crate::HistoryStore`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> Result<WeatherObservation, WeatherError>;

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for OpenWeather.\n\
             Hint: run `wxdash configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::with_endpoints(
        api_key.to_owned(),
        config.current_url.clone(),
        config.forecast_url.clone(),
    )))
}
