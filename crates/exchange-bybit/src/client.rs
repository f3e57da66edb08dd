//! Bybit V5 REST client with rate limiting and HMAC request signing.

use crate::models::ApiResponse;
use crate::signing::sign_request;
use anyhow::{anyhow, Context, Result};
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use nonzero_ext::nonzero;
use perp_agent_core::BybitConfig;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Non-zero `retCode` returned by the exchange.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Bybit API error {code}: {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

#[derive(Clone)]
struct Credentials {
    api_key: String,
    api_secret: String,
}

pub struct BybitClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
    recv_window_ms: u64,
    rate_limiter: Arc<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>>,
}

impl BybitClient {
    /// Creates an unauthenticated client for public market data.
    ///
    /// Rate limited to 10 requests per second.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::build(Client::new(), base_url.into(), nonzero!(10u32))
    }

    /// Creates an authenticated client from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built or the rate limit is zero
    pub fn from_config(config: &BybitConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        let per_second = NonZeroU32::new(config.requests_per_second)
            .ok_or_else(|| anyhow!("requests_per_second must be at least 1"))?;

        let mut client = Self::build(http, config.resolved_base_url(), per_second)
            .with_credentials(config.api_key.clone(), config.api_secret.clone());
        client.recv_window_ms = config.recv_window_ms;
        Ok(client)
    }

    fn build(http: Client, base_url: String, per_second: NonZeroU32) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            recv_window_ms: 5000,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
        }
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        });
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unsigned GET returning the decoded `result` object.
    pub(crate) async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let query = encode_query(params);
        let request = self.http.get(self.url(path, &query));
        Self::decode(self.send(request).await?)
    }

    /// Signed GET returning the decoded `result` object.
    pub(crate) async fn get_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let query = encode_query(params);
        let request = self.sign(self.http.get(self.url(path, &query)), &query)?;
        Self::decode(self.send(request).await?)
    }

    /// Signed JSON POST returning the raw envelope so callers can inspect `retCode`.
    pub(crate) async fn post_signed(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_string(body)?;
        let request = self
            .http
            .post(self.url(path, ""))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let request = self.sign(request, &body)?.body(body);
        self.send(request).await
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    fn sign(&self, request: RequestBuilder, payload: &str) -> Result<RequestBuilder> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| anyhow!("Authenticated endpoint requires API credentials"))?;

        let timestamp = chrono::Utc::now().timestamp_millis();
        let signature = sign_request(
            &credentials.api_secret,
            timestamp,
            &credentials.api_key,
            self.recv_window_ms,
            payload,
        )?;

        Ok(request
            .header("X-BAPI-API-KEY", &credentials.api_key)
            .header("X-BAPI-TIMESTAMP", timestamp.to_string())
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature))
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse> {
        self.rate_limiter.until_ready().await;

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("HTTP error {status}: {text}"));
        }

        let envelope = response.json::<ApiResponse>().await?;
        tracing::debug!(
            ret_code = envelope.ret_code,
            ret_msg = %envelope.ret_msg,
            "Bybit response"
        );
        Ok(envelope)
    }

    /// Fails on a non-zero `retCode`, otherwise decodes `result`.
    pub(crate) fn decode<T: DeserializeOwned>(envelope: ApiResponse) -> Result<T> {
        if envelope.ret_code != 0 {
            return Err(ApiError {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            }
            .into());
        }
        serde_json::from_value(envelope.result).context("Unexpected Bybit result payload")
    }
}

fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
