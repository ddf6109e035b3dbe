use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::LocationError,
    http::{HttpTransport, fetch_json},
    model::Coordinates,
    retry::{RetryPolicy, with_retry},
};

pub const DEFAULT_IP_API_URL: &str = "http://ip-api.com/json/";

/// Finds out where the caller is.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve(&self) -> Result<Coordinates, LocationError>;
}

/// Approximates the caller's position from their public IP address using ip-api.com.
#[derive(Debug, Clone)]
pub struct IpLocationResolver {
    url: String,
    retry: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
}

impl IpLocationResolver {
    pub fn new(
        url: impl Into<String>,
        retry: RetryPolicy,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            url: url.into(),
            retry,
            transport,
        }
    }

    async fn attempt(&self) -> Result<Coordinates, LocationError> {
        let body = fetch_json(self.transport.as_ref(), &self.url).await?;
        parse_coordinates(body)
    }
}

#[async_trait]
impl LocationResolver for IpLocationResolver {
    async fn resolve(&self) -> Result<Coordinates, LocationError> {
        let coords = with_retry(self.retry, "geolocation lookup", || self.attempt())
            .await
            .map_err(|exhausted| LocationError::Exhausted {
                attempts: exhausted.attempts,
                last: Box::new(exhausted.last),
            })?;

        tracing::debug!(%coords, "resolved location");
        Ok(coords)
    }
}

fn parse_coordinates(body: Value) -> Result<Coordinates, LocationError> {
    // ip-api reports lookup failures (private or reserved ranges) with a 200.
    if body.get("status").and_then(Value::as_str) == Some("fail") {
        let reason = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no reason given")
            .to_string();
        return Err(LocationError::Rejected(reason));
    }

    Ok(Coordinates::new(
        coordinate("lat", body.get("lat"))?,
        coordinate("lon", body.get("lon"))?,
    ))
}

/// Accept a JSON number or a numeric string.
fn coordinate(key: &str, value: Option<&Value>) -> Result<f64, LocationError> {
    let parsed = match value {
        None | Some(Value::Null) => {
            return Err(LocationError::InvalidCoordinates(format!("`{key}` is missing")));
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| LocationError::InvalidCoordinates(format!("`{key}` is not a number")))
}
