//! Per-city temperature statistics over the lookup history.

use std::collections::HashMap;

use tracing::warn;

use crate::{
    error::HistoryError,
    history::{HistoryRecord, HistoryStore},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CitySummary {
    /// City name as reported by the service.
    pub city: String,
    pub lookups: usize,
    pub average_f: f64,
    pub min_f: f64,
    pub max_f: f64,
}

impl CitySummary {
    /// Spread between the warmest and coldest recorded reading.
    pub fn range_f(&self) -> f64 {
        self.max_f - self.min_f
    }
}

impl HistoryStore {
    /// Statistics for every city in the history, in first-seen order.
    pub fn summary(&self) -> Result<Vec<CitySummary>, HistoryError> {
        Ok(summarize(&self.scan()?.records))
    }
}

/// Group readable records by the service's city name. Records without a
/// usable observation are left out.
pub fn summarize(records: &[HistoryRecord]) -> Vec<CitySummary> {
    let mut cities: Vec<(String, Vec<f64>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let obs = match record.observation() {
            Ok(obs) => obs,
            Err(err) => {
                warn!(city = %record.city, date = %record.date, error = %err, "leaving record out of summary");
                continue;
            }
        };

        let slot = *index.entry(obs.city.clone()).or_insert_with(|| {
            cities.push((obs.city.clone(), Vec::new()));
            cities.len() - 1
        });
        cities[slot].1.push(obs.temperature_f);
    }

    cities
        .into_iter()
        .map(|(city, temps)| {
            let (min_f, max_f) = temps
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(*t), hi.max(*t)));
            CitySummary {
                city,
                lookups: temps.len(),
                average_f: temps.iter().sum::<f64>() / temps.len() as f64,
                min_f,
                max_f,
            }
        })
        .collect()
}
