//! Current-conditions lookup backed by the history file.

use anyhow::Result;
use tracing::debug;

use crate::{history::HistoryStore, model::WeatherObservation, provider::WeatherProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Use a recorded observation for the same city and date when one exists.
    PreferHistory,
    /// Always ask the service; the answer is still recorded.
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    History,
    Remote,
}

/// Resolve current conditions for `city` on `date`.
///
/// A remote answer is appended to `store` before it is returned. Service
/// errors are returned as-is and nothing is recorded.
pub async fn lookup_current(
    provider: &dyn WeatherProvider,
    store: &HistoryStore,
    city: &str,
    date: &str,
    policy: CachePolicy,
) -> Result<(WeatherObservation, Source)> {
    if policy == CachePolicy::PreferHistory {
        if let Some(obs) = store.lookup(city, date)? {
            debug!(city, date, "serving observation from history");
            return Ok((obs, Source::History));
        }
    }

    let obs = provider.fetch_current(city).await?;
    store.append(city, date, &obs)?;
    Ok((obs, Source::Remote))
}
