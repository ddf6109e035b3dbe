use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{FetchError, TransportError};

/// Raw response of a GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The only network capability the resolvers need.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let res = self.http.get(url).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// GET `url`, require a `200`, and decode the body as JSON.
///
/// Resolvers turn the `FetchError` into their own error type with `?`.
pub async fn fetch_json(transport: &dyn HttpTransport, url: &str) -> Result<Value, FetchError> {
    tracing::debug!(url = %redact(url), "sending request");

    let res = transport.get(url).await?;

    if res.status != 200 {
        return Err(FetchError::Status {
            status: res.status,
            body: truncate_body(&res.text()),
        });
    }

    res.json().map_err(|err| FetchError::Json(err.to_string()))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

/// Hide the `appid` query value so API keys never end up in logs.
fn redact(url: &str) -> String {
    match url.find("appid=") {
        Some(start) => {
            let value_start = start + "appid=".len();
            let value_end = url[value_start..]
                .find('&')
                .map(|i| value_start + i)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
