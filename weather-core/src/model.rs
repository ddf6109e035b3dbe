use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherType {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Clear,
    Fog,
    Clouds,
}

/// Code prefixes in match priority order. `800` must be tried before `80`.
const WEATHER_TYPE_PREFIXES: &[(&str, WeatherType)] = &[
    ("2", WeatherType::Thunderstorm),
    ("3", WeatherType::Drizzle),
    ("5", WeatherType::Rain),
    ("6", WeatherType::Snow),
    ("7", WeatherType::Fog),
    ("800", WeatherType::Clear),
    ("80", WeatherType::Clouds),
];

impl WeatherType {
    /// Bucket an OpenWeather condition id (always three digits) into a weather type.
    ///
    /// Returns `None` for ids outside the registered groups.
    pub fn from_code(code: i64) -> Option<Self> {
        if !(100..=999).contains(&code) {
            return None;
        }

        let code = code.to_string();
        WEATHER_TYPE_PREFIXES
            .iter()
            .find(|(prefix, _)| code.starts_with(prefix))
            .map(|(_, weather_type)| *weather_type)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherType::Thunderstorm => "Thunderstorm",
            WeatherType::Drizzle => "Drizzle",
            WeatherType::Rain => "Rain",
            WeatherType::Snow => "Snow",
            WeatherType::Clear => "Clear",
            WeatherType::Fog => "Fog",
            WeatherType::Clouds => "Clouds",
        }
    }
}

impl std::fmt::Display for WeatherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated snapshot of the current conditions for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Degrees Celsius, rounded to the nearest integer.
    pub temperature: f64,
    pub weather_type: WeatherType,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub city: String,
    #[serde(default)]
    pub details: WeatherDetails,
}

/// Secondary readings. Providers omit these freely, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherDetails {
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure_hpa: Option<i64>,
    pub humidity_pct: Option<i64>,
    pub wind_speed_mps: Option<f64>,
    pub wind_direction: Option<String>,
    pub visibility_km: Option<f64>,
    pub clouds_pct: Option<i64>,
    pub description: Option<String>,
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Map a meteorological wind bearing in degrees to a 16-point compass label.
pub fn compass_point(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}
