//! Reduction of 3-hour forecast points to per-day summaries.

use std::collections::HashMap;

use crate::model::{DailyForecast, ForecastEntry};

/// Group forecast entries by calendar date and summarise each day.
///
/// Days come out in the order their date first appears in `entries`, which
/// need not be sorted. Each day's description and icon come from its first
/// entry; high and low are the max and min temperatures seen that day.
pub fn aggregate(entries: &[ForecastEntry]) -> Vec<DailyForecast> {
    let mut buckets: Vec<(&str, Vec<&ForecastEntry>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let date = entry.date();
        let slot = *index.entry(date).or_insert_with(|| {
            buckets.push((date, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(entry);
    }

    buckets.into_iter().filter_map(|(date, day)| summarize(date, &day)).collect()
}

fn summarize(date: &str, day: &[&ForecastEntry]) -> Option<DailyForecast> {
    let first = day.first()?;
    let (low_f, high_f) = day.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), e| (lo.min(e.temperature_f), hi.max(e.temperature_f)),
    );

    Some(DailyForecast {
        date: date.to_string(),
        description: first.description.clone(),
        icon: first.icon.clone(),
        high_f,
        low_f,
    })
}

/// Days worth showing in a forecast view.
///
/// A leading day equal to `today` is usually partial (only the remaining
/// 3-hour slots), so it is dropped before taking `count` days.
pub fn upcoming_days(daily: &[DailyForecast], today: &str, count: usize) -> Vec<DailyForecast> {
    let skip = usize::from(daily.first().is_some_and(|d| d.date == today));
    daily.iter().skip(skip).take(count).cloned().collect()
}
