use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Value, json};

/// Current conditions for a city, as reported by the weather service.
///
/// The service payload is kept verbatim alongside the extracted fields and
/// is what gets serialized, so records written to the history file carry
/// everything the service sent (`coord`, `wind`, ...), not just the fields
/// read here.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// City name as returned by the service, not necessarily the query string.
    pub city: String,
    pub temperature_f: f64,
    pub humidity_pct: u8,
    /// Rain over the last hour, in inches. Zero when the service omits it.
    pub precipitation_in: f64,
    pub description: String,
    pub icon: String,
    raw: Value,
}

impl WeatherObservation {
    /// Build an observation from scratch, synthesising a minimal payload.
    pub fn new(
        city: &str,
        temperature_f: f64,
        humidity_pct: u8,
        precipitation_in: f64,
        description: &str,
        icon: &str,
    ) -> Self {
        let mut raw = json!({
            "name": city,
            "main": { "temp": temperature_f, "humidity": humidity_pct },
            "weather": [{ "description": description, "icon": icon }],
        });
        if precipitation_in > 0.0 {
            raw["rain"] = json!({ "1h": precipitation_in });
        }

        Self {
            city: city.to_string(),
            temperature_f,
            humidity_pct,
            precipitation_in,
            description: description.to_string(),
            icon: icon.to_string(),
            raw,
        }
    }

    /// Extract the fields from a service payload, keeping the payload itself.
    pub fn from_payload(raw: Value) -> Result<Self, serde_json::Error> {
        let payload = ObservationPayload::deserialize(&raw)?;
        let condition = payload
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| {
                <serde_json::Error as de::Error>::custom("observation has no weather condition")
            })?;

        Ok(Self {
            city: payload.name,
            temperature_f: payload.main.temp,
            humidity_pct: payload.main.humidity,
            precipitation_in: payload.rain.map(|r| r.one_hour).unwrap_or(0.0),
            description: condition.description,
            icon: condition.icon,
            raw,
        })
    }

    /// The payload exactly as the service returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for WeatherObservation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeatherObservation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_payload(raw).map_err(de::Error::custom)
    }
}

/// One 3-hour point of the 5-day forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    /// `YYYY-MM-DD HH:MM:SS`, as in the service's `dt_txt`.
    pub timestamp: String,
    pub temperature_f: f64,
    pub description: String,
    pub icon: String,
}

impl ForecastEntry {
    /// Calendar date portion of the timestamp.
    pub fn date(&self) -> &str {
        self.timestamp
            .split(|c: char| c == ' ' || c == 'T')
            .next()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: String,
    pub description: String,
    pub icon: String,
    pub high_f: f64,
    pub low_f: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "F")]
    Fahrenheit,
    #[serde(rename = "C")]
    Celsius,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "F",
            TemperatureUnit::Celsius => "C",
        }
    }

    /// Convert a Fahrenheit reading into this unit.
    pub fn from_fahrenheit(&self, temp_f: f64) -> f64 {
        match self {
            TemperatureUnit::Fahrenheit => temp_f,
            TemperatureUnit::Celsius => (temp_f - 32.0) * 5.0 / 9.0,
        }
    }

    /// Converted and rounded to one decimal, e.g. `37.0`.
    pub fn format(&self, temp_f: f64) -> String {
        format!("{:.1}", self.from_fahrenheit(temp_f))
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "F" | "FAHRENHEIT" => Ok(TemperatureUnit::Fahrenheit),
            "C" | "CELSIUS" => Ok(TemperatureUnit::Celsius),
            _ => Err(format!("Unknown temperature unit '{s}'. Use F or C.")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationPayload {
    name: String,
    main: PayloadMain,
    #[serde(default)]
    rain: Option<PayloadRain>,
    weather: Vec<PayloadCondition>,
}

#[derive(Debug, Deserialize)]
struct PayloadMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct PayloadRain {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

#[derive(Debug, Deserialize)]
struct PayloadCondition {
    description: String,
    icon: String,
}
