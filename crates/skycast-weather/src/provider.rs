//! Current-conditions client for Open-Meteo compatible APIs.

use crate::types::{CurrentWeather, Location, TemperatureUnit, WeatherCondition, WeatherError};
use chrono::{NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str =
    "temperature_2m,apparent_temperature,relative_humidity_2m,wind_speed_10m,weather_code";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    unit: TemperatureUnit,
}

impl WeatherProvider {
    pub fn new(unit: TemperatureUnit) -> Result<Self, WeatherError> {
        Self::with_base_url(DEFAULT_API_URL, unit)
    }

    /// Create a provider pointed at a custom API root (mirrors, test servers).
    pub fn with_base_url(base_url: impl Into<String>, unit: TemperatureUnit) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            unit,
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Fetch current conditions for a location.
    ///
    /// # Errors
    /// Returns `WeatherError::Network` on transport failure, `WeatherError::Status` on a
    /// non-success response and `WeatherError::Parse` if the body is not understood.
    pub async fn fetch_current(&self, location: &Location) -> Result<CurrentWeather, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        tracing::info!(
            "Fetching current weather for {}, {}",
            location.latitude,
            location.longitude
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("temperature_unit", self.unit.api_param().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Weather API error {}: {}", status, body);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(parsed.current.into_current_weather(self.unit))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    time: Option<String>,
    temperature_2m: f64,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    weather_code: i32,
}

impl OpenMeteoCurrent {
    fn into_current_weather(self, requested: TemperatureUnit) -> CurrentWeather {
        let updated_at = self
            .time
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok())
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);

        let unit = match requested {
            TemperatureUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Auto | TemperatureUnit::Celsius => TemperatureUnit::Celsius,
        };

        CurrentWeather {
            temperature: self.temperature_2m,
            feels_like: self.apparent_temperature.unwrap_or(self.temperature_2m),
            humidity: self.relative_humidity_2m.unwrap_or(0.0).round().clamp(0.0, 100.0) as u8,
            wind_speed: self.wind_speed_10m.unwrap_or(0.0),
            condition: WeatherCondition::from_wmo_code(self.weather_code),
            unit,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider =
            WeatherProvider::with_base_url("http://localhost:9000/", TemperatureUnit::Celsius).unwrap();
        assert_eq!(provider.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_open_meteo_current_mapping() {
        let raw: OpenMeteoCurrent = serde_json::from_value(serde_json::json!({
            "time": "2026-10-15T12:00",
            "temperature_2m": 18.4,
            "apparent_temperature": 17.0,
            "relative_humidity_2m": 61.6,
            "wind_speed_10m": 9.3,
            "weather_code": 63
        }))
        .unwrap();

        let current = raw.into_current_weather(TemperatureUnit::Auto);
        assert_eq!(current.condition, WeatherCondition::Rain);
        assert_eq!(current.humidity, 62);
        assert_eq!(current.unit, TemperatureUnit::Celsius);
        assert_eq!(current.updated_at.to_rfc3339(), "2026-10-15T12:00:00+00:00");
    }

    #[test]
    fn test_missing_optional_fields_fall_back() {
        let raw: OpenMeteoCurrent = serde_json::from_value(serde_json::json!({
            "temperature_2m": -2.0,
            "weather_code": 71
        }))
        .unwrap();

        let current = raw.into_current_weather(TemperatureUnit::Celsius);
        assert_eq!(current.feels_like, -2.0);
        assert_eq!(current.humidity, 0);
        assert_eq!(current.condition, WeatherCondition::Snow);
    }
}
