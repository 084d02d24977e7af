//! HTTP client for the dashboard's location endpoints.
//!
//! Every endpoint answers with a `{ "data": ... }` envelope:
//!
//! | Endpoint                    | Payload        |
//! |-----------------------------|----------------|
//! | `GET states`                | `[State]`      |
//! | `GET states/{id}/cities`    | `[City]`       |
//! | `GET centers`               | `[Center]`     |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use ridedesk_core::{AppConfig, Center, City, State};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::SourceError;
use crate::retry::RetryPolicy;
use crate::source::LocationSource;

const DEFAULT_USER_AGENT: &str = "ridedesk/0.1 (dashboard)";

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Client for the location REST API.
///
/// Use [`LocationClient::from_config`] in binaries; tests point
/// [`LocationClient::new`] at a mock server.
pub struct LocationClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
    retry: RetryPolicy,
}

impl LocationClient {
    /// Creates a client with no auth token and no retries.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Self::build(base_url, timeout_secs, DEFAULT_USER_AGENT)
    }

    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if the config has no API base
    /// URL or it cannot be parsed, and [`SourceError::Http`] if the client
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let Some(base_url) = config.api_base_url.as_deref() else {
            return Err(SourceError::InvalidBaseUrl {
                url: String::new(),
                reason: "RIDEDESK_API_BASE_URL is not set".to_owned(),
            });
        };
        let mut client = Self::build(base_url, config.request_timeout_secs, &config.user_agent)?
            .with_retries(config.max_retries, config.retry_backoff_base_ms);
        if let Some(token) = &config.api_token {
            client = client.with_token(token);
        }
        Ok(client)
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_owned());
        self
    }

    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.retry = RetryPolicy {
            max_retries,
            backoff_base_ms,
        };
        self
    }

    fn build(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash keeps the last base path segment when endpoint
        // segments are appended.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "expected an absolute http(s) URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            api_token: None,
            retry: RetryPolicy::none(),
        })
    }

    /// # Errors
    ///
    /// Returns [`SourceError`] on network failure, non-2xx status, or a
    /// malformed body.
    pub async fn get_states(&self) -> Result<Vec<State>, SourceError> {
        let url = self.endpoint_url(&["states"]);
        self.get_data(&url).await
    }

    /// # Errors
    ///
    /// Returns [`SourceError`] on network failure, non-2xx status, or a
    /// malformed body.
    pub async fn get_cities(&self, state_id: &str) -> Result<Vec<City>, SourceError> {
        let url = self.endpoint_url(&["states", state_id, "cities"]);
        self.get_data(&url).await
    }

    /// # Errors
    ///
    /// Returns [`SourceError`] on network failure, non-2xx status, or a
    /// malformed body.
    pub async fn get_centers(&self) -> Result<Vec<Center>, SourceError> {
        let url = self.endpoint_url(&["centers"]);
        self.get_data(&url).await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `build` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_data<T: DeserializeOwned>(&self, url: &Url) -> Result<T, SourceError> {
        tracing::debug!(url = %url, "requesting locations");
        self.retry.run(url.path(), || self.request_once(url)).await
    }

    async fn request_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, SourceError> {
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        let envelope: DataEnvelope<T> =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: url.path().to_owned(),
                source: e,
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl LocationSource for LocationClient {
    async fn fetch_states(&self) -> Result<Vec<State>, SourceError> {
        self.get_states().await
    }

    async fn fetch_centers(&self) -> Result<Vec<Center>, SourceError> {
        self.get_centers().await
    }

    async fn fetch_cities(&self, state_id: &str) -> Result<Vec<City>, SourceError> {
        self.get_cities(state_id).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
