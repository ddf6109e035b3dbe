//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - IP-based location lookup with bounded retry
//! - OpenWeather lookup with field-level validation
//! - Shared domain models (coordinates, weather)
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod http;
pub mod location;
pub mod model;
pub mod provider;
pub mod retry;
pub mod service;

pub use config::Config;
pub use error::{FetchError, LocationError, LookupError, TransportError, WeatherError};
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use location::{IpLocationResolver, LocationResolver};
pub use model::{Coordinates, Weather, WeatherDetails, WeatherType};
pub use provider::{WeatherResolver, openweather::OpenWeatherResolver};
pub use retry::RetryPolicy;
pub use service::WeatherService;
