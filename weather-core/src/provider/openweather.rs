use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::model::{FetchOutcome, display_value};

use super::{WeatherProvider, truncate_body};

/// OpenWeather current-weather endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, location: &str) -> FetchOutcome {
        debug!(location, "requesting current weather");

        let res = match self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "en"),
            ])
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => {
                debug!(location, error = %err, "request failed");
                return FetchOutcome::failure(None, err.to_string());
            }
        };

        let status = res.status();
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::failure(None, err.to_string()),
        };
        debug!(location, status = status.as_u16(), "response received");

        let payload: Value = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) => {
                return FetchOutcome::failure(
                    Some(status.as_u16()),
                    format!("invalid JSON in response: {}", truncate_body(&body)),
                );
            }
        };

        if status.is_client_error() || status.is_server_error() {
            let message = payload
                .get("message")
                .filter(|m| !m.is_null())
                .map(display_value)
                .unwrap_or_else(|| "unknown error".to_string());
            return FetchOutcome::failure(Some(status.as_u16()), message);
        }

        FetchOutcome::Success(payload)
    }
}
