//! Weather API client for OpenWeatherMap integration
//!
//! Fetches current conditions for a city and reduces them to the
//! [`WeatherObservation`] the explore page needs. Transient network failures
//! are retried by the middleware stack; an unknown city surfaces as its own
//! error so the handler can say so instead of returning a generic failure.

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::StyleCastError;
use crate::config::WeatherConfig;
use crate::models::WeatherObservation;

/// Weather API client
pub struct WeatherClient {
    client: ClientWithMiddleware,
    config: WeatherConfig,
}

impl WeatherClient {
    /// Create a new weather API client
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("StyleCast/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    /// Get the current weather observation for a city.
    #[instrument(skip(self))]
    pub async fn current(&self, city: &str) -> crate::Result<WeatherObservation> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| StyleCastError::config("Weather API key is not configured"))?;

        let url = format!(
            "{}/weather?q={}&appid={}&units={}",
            self.config.base_url,
            urlencoding::encode(city),
            api_key,
            self.config.units
        );

        info!("Fetching current weather for '{city}'");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Weather request failed: {e}");
            StyleCastError::api(format!("Weather request failed: {e}"))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("Weather provider does not know city '{city}'");
            return Err(StyleCastError::CityNotFound { city: city.into() });
        }
        if status == StatusCode::UNAUTHORIZED {
            error!("Weather API authentication failed (HTTP 401)");
            return Err(StyleCastError::api(
                "Invalid weather API key. Please check your configuration.",
            ));
        }
        if !status.is_success() {
            error!("Weather API request failed with status {status}");
            return Err(StyleCastError::api(format!(
                "Weather API request failed with status: {status}"
            )));
        }

        let body: openweathermap::CurrentResponse = response.json().await.map_err(|e| {
            error!("Failed to parse weather response: {e}");
            StyleCastError::api("Invalid weather data received from provider")
        })?;

        // Some plans answer 200 with an empty name instead of a 404.
        if body.name.is_empty() {
            return Err(StyleCastError::CityNotFound { city: city.into() });
        }

        let condition = body.weather.first().ok_or_else(|| {
            StyleCastError::api("Weather response contained no conditions")
        })?;

        debug!(
            "Weather for {}: {} ({:.1}°C)",
            body.name, condition.description, body.main.temp
        );

        Ok(WeatherObservation {
            city_name: body.name.clone(),
            description: condition.description.clone(),
            icon: condition.icon.clone(),
            temperature_c: body.main.temp,
            fetched_at: Utc::now(),
        })
    }
}

/// `OpenWeatherMap` API response structures
mod openweathermap {
    use serde::Deserialize;

    /// Current conditions response from the `/weather` endpoint
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub main: Main,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> WeatherClient {
        let config = WeatherConfig {
            api_key: Some("test_weather_key_123".to_string()),
            base_url: server.base_url(),
            units: "metric".to_string(),
            timeout_seconds: 5,
            max_retries: 0,
        };
        WeatherClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_current_weather_happy_path() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/weather")
                .query_param("q", "toronto")
                .query_param("appid", "test_weather_key_123")
                .query_param("units", "metric");
            then.status(200).json_body(json!({
                "name": "Toronto",
                "weather": [{"description": "light rain", "icon": "10d"}],
                "main": {"temp": 12.5}
            }));
        });

        let client = client_for(&server);
        let observation = client.current("toronto").await.unwrap();

        mock.assert();
        assert_eq!(observation.city_name, "Toronto");
        assert_eq!(observation.description, "light rain");
        assert_eq!(observation.icon, "10d");
        assert!((observation.temperature_c - 12.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_unknown_city_is_its_own_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(404)
                .json_body(json!({"cod": "404", "message": "city not found"}));
        });

        let client = client_for(&server);
        let err = client.current("atlantis").await.unwrap_err();
        assert!(matches!(err, StyleCastError::CityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_empty_name_in_body_means_unknown_city() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(200).json_body(json!({
                "name": "",
                "weather": [{"description": "clear sky", "icon": "01d"}],
                "main": {"temp": 20.0}
            }));
        });

        let client = client_for(&server);
        let err = client.current("nowhere").await.unwrap_err();
        assert!(matches!(err, StyleCastError::CityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_server_error_becomes_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(500);
        });

        let client = client_for(&server);
        let err = client.current("toronto").await.unwrap_err();
        assert!(matches!(err, StyleCastError::Api { .. }));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let config = WeatherConfig {
            api_key: None,
            ..WeatherConfig::default()
        };
        let client = WeatherClient::new(config).unwrap();
        let err = client.current("toronto").await.unwrap_err();
        assert!(matches!(err, StyleCastError::Config { .. }));
    }
}
