use crate::{
    Config, Coordinates, Weather,
    error::WeatherError,
    http::HttpTransport,
    provider::openweather::OpenWeatherResolver,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Turns coordinates into the current weather there.
#[async_trait]
pub trait WeatherResolver: Send + Sync + Debug {
    async fn resolve(&self, coords: Coordinates) -> Result<Weather, WeatherError>;
}

/// Construct the OpenWeather resolver from config.
///
/// Fails when no API key is available; that is a configuration problem, not a lookup one.
pub fn weather_resolver_from_config(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> anyhow::Result<Box<dyn WeatherResolver>> {
    let url_template = config.weather_url_template()?;
    let retry = config.weather_retry()?;

    Ok(Box::new(OpenWeatherResolver::new(url_template, retry, transport)))
}
