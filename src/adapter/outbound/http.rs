//! Shared `reqwest` plumbing for the HTTP-backed adapters.
//!
//! Retries live in the application layer; this module only builds clients and
//! maps HTTP status codes onto the crate's error classes.

use std::time::Duration;

use reqwest::{Client as HttpClient, Proxy, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, Result};

/// Client settings shared by every HTTP adapter.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Optional proxy URL applied to every request.
    pub proxy: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            proxy: None,
        }
    }
}

/// Build a client, falling back to defaults if the settings are rejected.
#[must_use]
pub fn build_client(settings: &HttpSettings) -> HttpClient {
    let mut builder = HttpClient::builder()
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout);
    if let Some(proxy) = &settings.proxy {
        match Proxy::all(proxy) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(err) => warn!(error = %err, "Ignoring invalid proxy"),
        }
    }
    builder.build().unwrap_or_else(|err| {
        warn!(error = %err, "Failed to build HTTP client, using defaults");
        HttpClient::new()
    })
}

/// Send `request` and decode a JSON body.
///
/// 429 becomes [`Error::RateLimited`]; other non-success statuses become
/// [`Error::Http`].
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::RateLimited(response.url().to_string()));
    }
    let response = response.error_for_status()?;
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_proxy_does_not_prevent_client() {
        let settings = HttpSettings {
            proxy: Some("::not a url::".into()),
            ..HttpSettings::default()
        };
        let _client = build_client(&settings);
    }
}
