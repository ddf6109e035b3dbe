use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    error::{SunEvent, WeatherError},
    http::{HttpTransport, fetch_json},
    model::{Coordinates, Weather, WeatherDetails, WeatherType, compass_point},
    retry::{RetryPolicy, with_retry},
};

use super::WeatherResolver;

pub const DEFAULT_URL_TEMPLATE: &str = "https://api.openweathermap.org/data/2.5/weather?\
     lat={latitude}&lon={longitude}&appid={api_key}&lang=en&units=metric";

/// Current conditions from the OpenWeather `/data/2.5/weather` endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherResolver {
    url_template: String,
    retry: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
}

impl OpenWeatherResolver {
    /// `url_template` must already carry the API key; `{latitude}` and
    /// `{longitude}` are filled in per request.
    pub fn new(
        url_template: impl Into<String>,
        retry: RetryPolicy,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            url_template: url_template.into(),
            retry,
            transport,
        }
    }

    fn url_for(&self, coords: Coordinates) -> String {
        self.url_template
            .replace("{latitude}", &coords.latitude.to_string())
            .replace("{longitude}", &coords.longitude.to_string())
    }

    async fn attempt(&self, url: &str) -> Result<Weather, WeatherError> {
        let body = fetch_json(self.transport.as_ref(), url).await?;
        parse_weather(&body)
    }
}

#[async_trait]
impl WeatherResolver for OpenWeatherResolver {
    async fn resolve(&self, coords: Coordinates) -> Result<Weather, WeatherError> {
        let url = self.url_for(coords);

        let weather = with_retry(self.retry, "weather lookup", || self.attempt(&url))
            .await
            .map_err(|exhausted| {
                if exhausted.attempts > 1 {
                    WeatherError::Exhausted {
                        attempts: exhausted.attempts,
                        last: Box::new(exhausted.last),
                    }
                } else {
                    exhausted.last
                }
            })?;

        tracing::debug!(
            city = %weather.city,
            weather_type = %weather.weather_type,
            "resolved weather"
        );
        Ok(weather)
    }
}

/// Validate an OpenWeather response.
///
/// Either every required field checks out or nothing is returned.
pub fn parse_weather(body: &Value) -> Result<Weather, WeatherError> {
    Ok(Weather {
        temperature: parse_temperature(body)?,
        weather_type: parse_weather_type(body)?,
        sunrise: parse_sun_time(body, SunEvent::Sunrise)?,
        sunset: parse_sun_time(body, SunEvent::Sunset)?,
        city: parse_city(body)?,
        details: parse_details(body),
    })
}

fn parse_temperature(body: &Value) -> Result<f64, WeatherError> {
    let temp = body
        .pointer("/main/temp")
        .ok_or_else(|| WeatherError::InvalidTemperature("`main.temp` is missing".into()))?;

    temp.as_f64()
        .filter(|t| t.is_finite())
        .map(f64::round)
        .ok_or_else(|| {
            WeatherError::InvalidTemperature(format!("`main.temp` is not a number: {temp}"))
        })
}

fn parse_weather_type(body: &Value) -> Result<WeatherType, WeatherError> {
    let missing = |what: &str| WeatherError::MissingWeatherType(what.to_string());

    let conditions = body
        .get("weather")
        .ok_or_else(|| missing("`weather` is missing"))?
        .as_array()
        .ok_or_else(|| missing("`weather` is not an array"))?;
    let raw = conditions
        .first()
        .ok_or_else(|| missing("`weather` is empty"))?
        .get("id")
        .filter(|id| !id.is_null())
        .ok_or_else(|| missing("`weather[0].id` is missing"))?;
    let id = raw.as_i64().ok_or_else(|| {
        WeatherError::InvalidWeatherTypeId(format!("`weather[0].id` is not an integer: {raw}"))
    })?;

    WeatherType::from_code(id).ok_or(WeatherError::UnregisteredWeatherType(id))
}

fn parse_sun_time(body: &Value, event: SunEvent) -> Result<DateTime<Utc>, WeatherError> {
    let invalid = |reason: String| WeatherError::InvalidSunTime { event, reason };

    let raw = body
        .get("sys")
        .and_then(|sys| sys.get(event.as_str()))
        .ok_or_else(|| invalid(format!("`sys.{event}` is missing")))?;
    let secs = raw
        .as_i64()
        .ok_or_else(|| invalid(format!("`sys.{event}` is not an integer timestamp: {raw}")))?;

    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| invalid(format!("`sys.{event}` is out of range: {secs}")))
}

fn parse_city(body: &Value) -> Result<String, WeatherError> {
    match body.get("name") {
        None | Some(Value::Null) => Err(WeatherError::InvalidCity("`name` is missing".into())),
        Some(Value::String(name)) => Ok(name.clone()),
        Some(other) => Err(WeatherError::InvalidCity(format!("`name` is not a string: {other}"))),
    }
}

fn parse_details(body: &Value) -> WeatherDetails {
    let float = |path: &str| body.pointer(path).and_then(Value::as_f64).filter(|v| v.is_finite());
    let int = |path: &str| {
        body.pointer(path)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64)))
    };

    WeatherDetails {
        feels_like: float("/main/feels_like"),
        temp_min: float("/main/temp_min"),
        temp_max: float("/main/temp_max"),
        pressure_hpa: int("/main/pressure"),
        humidity_pct: int("/main/humidity"),
        wind_speed_mps: float("/wind/speed"),
        wind_direction: float("/wind/deg").map(|deg| compass_point(deg).to_string()),
        visibility_km: float("/visibility").map(|metres| metres / 1000.0),
        clouds_pct: int("/clouds/all"),
        description: body
            .pointer("/weather/0/description")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
