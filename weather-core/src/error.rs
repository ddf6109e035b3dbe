//! Error types for the location and weather lookups.
//!
//! Each resolver owns one error enum. Lower-level failures are wrapped with
//! their original message kept inside the outer one.

use std::fmt;

use thiserror::Error;

/// The HTTP client could not complete the request (DNS, connect, timeout, ...).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Failure of the shared request / status check / JSON decode step.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("transport failure: {0}. Check your internet connection")]
    Transport(#[from] TransportError),

    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid json: {0}")]
    Json(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum LocationError {
    #[error("location lookup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("geolocation lookup rejected: {0}")]
    Rejected(String),

    #[error("failed to resolve location after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<LocationError>,
    },
}

/// Which sun event a timestamp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunEvent {
    Sunrise,
    Sunset,
}

impl SunEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunEvent::Sunrise => "sunrise",
            SunEvent::Sunset => "sunset",
        }
    }
}

impl fmt::Display for SunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    #[error("failed to get weather: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid temperature: {0}")]
    InvalidTemperature(String),

    #[error("missing weather type field: {0}")]
    MissingWeatherType(String),

    #[error("unregistered weather type id {0}")]
    UnregisteredWeatherType(i64),

    #[error("unregistered weather type id: {0}")]
    InvalidWeatherTypeId(String),

    #[error("invalid suntime ({event}): {reason}")]
    InvalidSunTime { event: SunEvent, reason: String },

    #[error("invalid city: {0}")]
    InvalidCity(String),

    #[error("failed to get weather after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<WeatherError>,
    },
}

/// Failure of the full location -> weather lookup.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_messages_keep_the_cause() {
        let err = WeatherError::from(FetchError::Status {
            status: 404,
            body: "city not found".into(),
        });
        let msg = err.to_string();
        assert!(msg.contains("http status 404"));
        assert!(msg.contains("city not found"));

        let err = LocationError::from(FetchError::from(TransportError::new("connection refused")));
        let msg = err.to_string();
        assert!(msg.contains("transport failure"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn exhausted_names_attempts_and_last_error() {
        let err = LocationError::Exhausted {
            attempts: 3,
            last: Box::new(LocationError::InvalidCoordinates("`lat` is missing".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("after 3 attempts"));
        assert!(msg.contains("invalid coordinates: `lat` is missing"));
    }

    #[test]
    fn suntime_error_names_the_event() {
        let err = WeatherError::InvalidSunTime {
            event: SunEvent::Sunset,
            reason: "`sys.sunset` is missing".into(),
        };
        assert_eq!(err.to_string(), "invalid suntime (sunset): `sys.sunset` is missing");
    }
}
