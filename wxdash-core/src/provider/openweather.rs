use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{ForecastEntry, WeatherObservation},
};

use super::WeatherProvider;

pub const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    current_url: String,
    forecast_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_endpoints(api_key: String, current_url: String, forecast_url: String) -> Self {
        Self { api_key, current_url, forecast_url, http: Client::new() }
    }

    /// GET `url` for `city` in imperial units and decode the body as `T`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, city: &str) -> Result<T, WeatherError> {
        debug!(url, city, "requesting OpenWeather");

        let res = self
            .http
            .get(url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "imperial")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound { city: city.to_string() });
        }
        if !status.is_success() {
            return Err(WeatherError::Service { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwForecastEntry> for ForecastEntry {
    fn from(entry: OwForecastEntry) -> Self {
        let (description, icon) = entry
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        ForecastEntry { timestamp: entry.dt_txt, temperature_f: entry.main.temp, description, icon }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, city: &str) -> Result<WeatherObservation, WeatherError> {
        self.get_json(&self.current_url, city).await
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
        let parsed: OwForecastResponse = self.get_json(&self.forecast_url, city).await?;
        Ok(parsed.list.into_iter().map(ForecastEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::with_endpoints(
            "test_key".into(),
            format!("{}/data/2.5/weather", server.uri()),
            format!("{}/data/2.5/forecast", server.uri()),
        )
    }

    #[tokio::test]
    async fn fetch_current_decodes_observation() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "new york"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "New York",
                "main": { "temp": 78.4, "humidity": 55 },
                "rain": { "1h": 0.02 },
                "weather": [{ "description": "light rain", "icon": "10d" }]
            })))
            .mount(&server)
            .await;

        let obs = provider(&server).fetch_current("new york").await.unwrap();

        assert_eq!(obs.city, "New York");
        assert_eq!(obs.temperature_f, 78.4);
        assert_eq!(obs.humidity_pct, 55);
        assert_eq!(obs.precipitation_in, 0.02);
        assert_eq!(obs.icon, "10d");
    }

    #[tokio::test]
    async fn not_found_maps_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = provider(&server).fetch_current("Atlantis").await.unwrap_err();

        assert!(matches!(err, WeatherError::NotFound { ref city } if city == "Atlantis"));
    }

    #[tokio::test]
    async fn other_failures_carry_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_forecast("London").await.unwrap_err();

        match err {
            WeatherError::Service { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_payload_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_current("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let server = MockServer::start().await;
        let unreachable = provider(&server);
        drop(server);

        let err = unreachable.fetch_current("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::Network(_)));
    }

    #[tokio::test]
    async fn forecast_for_unknown_city_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Atlantis"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = provider(&server).fetch_forecast("Atlantis").await.unwrap_err();

        assert!(matches!(err, WeatherError::NotFound { ref city } if city == "Atlantis"));
    }

    #[tokio::test]
    async fn forecast_transport_failure_is_a_network_error() {
        let server = MockServer::start().await;
        let unreachable = provider(&server);
        drop(server);

        let err = unreachable.fetch_forecast("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::Network(_)));
    }

    #[tokio::test]
    async fn fetch_forecast_maps_entries_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": "200",
                "city": { "name": "Paris", "country": "FR" },
                "list": [
                    {
                        "dt": 1717243200,
                        "dt_txt": "2024-06-01 12:00:00",
                        "main": { "temp": 71.6, "humidity": 40 },
                        "weather": [{ "description": "clear sky", "icon": "01d" }]
                    },
                    {
                        "dt": 1717254000,
                        "dt_txt": "2024-06-01 15:00:00",
                        "main": { "temp": 74.1, "humidity": 38 },
                        "weather": []
                    }
                ]
            })))
            .mount(&server)
            .await;

        let entries = provider(&server).fetch_forecast("Paris").await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, "2024-06-01 12:00:00");
        assert_eq!(entries[0].description, "clear sky");
        assert_eq!(entries[1].temperature_f, 74.1);
        assert_eq!(entries[1].description, "Unknown");
    }
}
