//! HTTP forwarder to the upstream model endpoint.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers, inject the upstream credential
//! - Default the `model` field and translate `inputs` into chat `messages`
//! - Map transport, status and decode failures onto [`UpstreamError`]

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use axum::http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::security::headers::strip_hop_by_hop;
use crate::upstream::error::UpstreamError;

/// Relays an approved request and returns the upstream's JSON response.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(
        &self,
        payload: Value,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Value, UpstreamError>;
}

/// Errors building the HTTP forwarder at startup.
#[derive(Debug, Error)]
pub enum ForwarderSetupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("upstream API key is not a valid header value")]
    InvalidApiKey,
}

/// reqwest-backed [`Forwarder`].
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    url: String,
    authorization: Option<HeaderValue>,
    default_model: String,
}

impl HttpForwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ForwarderSetupError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        let authorization = match &config.api_key {
            Some(key) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|_| ForwarderSetupError::InvalidApiKey)?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            client,
            url: config.url.clone(),
            authorization,
            default_model: config.default_model.clone(),
        })
    }

    /// Build the outbound header set from the client's headers.
    pub fn prepare_headers(&self, headers: &HeaderMap) -> HeaderMap {
        let mut outbound = strip_hop_by_hop(headers);
        if let Some(auth) = &self.authorization {
            outbound.insert(AUTHORIZATION, auth.clone());
        }
        outbound.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        outbound
    }

    /// Apply upstream-specific payload adjustments.
    pub fn prepare_payload(&self, mut payload: Value) -> Value {
        if let Some(body) = payload.as_object_mut() {
            if !body.contains_key("model") {
                body.insert("model".to_string(), Value::String(self.default_model.clone()));
            }
            if !body.contains_key("messages") {
                if let Some(inputs) = body.remove("inputs") {
                    body.insert(
                        "messages".to_string(),
                        json!([{ "role": "user", "content": inputs }]),
                    );
                }
            }
        }
        payload
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        payload: Value,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let payload = self.prepare_payload(payload);
        let headers = self.prepare_headers(headers);

        let response = self
            .client
            .post(&self.url)
            .headers(headers)
            .json(&payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(timeout.as_secs())
            } else {
                UpstreamError::InvalidResponse(e.to_string())
            }
        })
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout(timeout.as_secs())
    } else {
        UpstreamError::Unreachable(e.to_string())
    }
}
