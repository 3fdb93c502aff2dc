use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a temperature in this unit to Celsius.
    ///
    /// `Auto` is treated as Celsius.
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Self::Auto | Self::Celsius => value,
        }
    }

    /// Query parameter value understood by Open-Meteo.
    pub fn api_param(self) -> &'static str {
        match self {
            Self::Fahrenheit => "fahrenheit",
            Self::Auto | Self::Celsius => "celsius",
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear,
        }
    }

    /// Condition label as matched against recommendation catalogs
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Icon name for display layers
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "cloud_rain",
            Self::Snow | Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            city_name: None,
        }
    }
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    /// Unit `temperature` and `feels_like` are expressed in
    pub unit: TemperatureUnit,
    pub updated_at: DateTime<Utc>,
}

impl CurrentWeather {
    /// Reduce to the snapshot the recommendation engine consumes, in Celsius.
    pub fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot::new(
            self.unit.to_celsius(self.temperature),
            self.condition.description(),
        )
    }
}

/// Minimal weather state needed to pick recommendations.
///
/// Temperatures are Celsius; catalog bounds are expressed in Celsius too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub condition: String,
}

impl WeatherSnapshot {
    pub fn new(temperature: f64, condition: impl Into<String>) -> Self {
        Self {
            temperature,
            condition: condition.into(),
        }
    }

    /// Build a snapshot from a reading taken in `unit`.
    pub fn in_unit(temperature: f64, unit: TemperatureUnit, condition: impl Into<String>) -> Self {
        Self::new(unit.to_celsius(temperature), condition)
    }

    /// Extract a snapshot from a loosely-typed weather payload.
    ///
    /// Accepts `{"current": {"temperature": 22, "condition": "Clear"}}` as well as the
    /// `{"current": {"temp_c": 22, "condition": {"text": "Clear"}}}` shape. Returns `None`
    /// when either field is missing or has the wrong type.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let parsed = match SnapshotPayload::deserialize(payload) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Ignoring malformed weather payload: {}", e);
                return None;
            }
        };

        let current = parsed.current?;
        let temperature = current.temperature.or(current.temp_c)?;
        let condition = match current.condition? {
            ConditionPayload::Label(label) => label,
            ConditionPayload::Described { text } => text,
        };

        Some(Self::new(temperature, condition))
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotPayload {
    current: Option<CurrentPayload>,
}

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    temperature: Option<f64>,
    temp_c: Option<f64>,
    condition: Option<ConditionPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConditionPayload {
    Label(String),
    Described { text: String },
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}
