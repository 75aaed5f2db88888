use crate::model::WeatherObservation;

/// Side-by-side view of two cities' current conditions.
///
/// Differences are `first - second`, temperatures in Fahrenheit.
#[derive(Debug, Clone, PartialEq)]
pub struct CityComparison {
    pub first: WeatherObservation,
    pub second: WeatherObservation,
    pub temperature_diff_f: f64,
    pub humidity_diff_pct: i16,
    pub precipitation_diff_in: f64,
}

impl CityComparison {
    pub fn new(first: WeatherObservation, second: WeatherObservation) -> Self {
        Self {
            temperature_diff_f: first.temperature_f - second.temperature_f,
            humidity_diff_pct: i16::from(first.humidity_pct) - i16::from(second.humidity_pct),
            precipitation_diff_in: first.precipitation_in - second.precipitation_in,
            first,
            second,
        }
    }

    /// Name of the warmer city, or `None` when both read the same.
    pub fn warmer(&self) -> Option<&str> {
        match self.first.temperature_f.partial_cmp(&self.second.temperature_f) {
            Some(std::cmp::Ordering::Greater) => Some(&self.first.city),
            Some(std::cmp::Ordering::Less) => Some(&self.second.city),
            _ => None,
        }
    }
}
