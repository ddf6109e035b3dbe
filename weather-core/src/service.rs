use std::sync::Arc;

use crate::{
    Config,
    error::LookupError,
    http::{HttpTransport, ReqwestTransport},
    location::{IpLocationResolver, LocationResolver},
    model::Weather,
    provider::{WeatherResolver, weather_resolver_from_config},
};

/// Runs the full lookup: where am I, then what is the weather there.
///
/// Every call issues fresh requests; nothing is cached between calls.
#[derive(Debug)]
pub struct WeatherService {
    locator: Box<dyn LocationResolver>,
    resolver: Box<dyn WeatherResolver>,
}

impl WeatherService {
    pub fn new(locator: Box<dyn LocationResolver>, resolver: Box<dyn WeatherResolver>) -> Self {
        Self { locator, resolver }
    }

    /// Wire up the ip-api.com locator and the OpenWeather resolver over one HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(config.request_timeout())?);

        let locator = IpLocationResolver::new(
            config.location.url.clone(),
            config.location_retry()?,
            transport.clone(),
        );
        let resolver = weather_resolver_from_config(config, transport)?;

        Ok(Self::new(Box::new(locator), resolver))
    }

    pub async fn current(&self) -> Result<Weather, LookupError> {
        let coords = self.locator.resolve().await?;
        let weather = self.resolver.resolve(coords).await?;
        Ok(weather)
    }
}
