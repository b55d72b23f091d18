//! Transport seam
//!
//! The runner talks to the remote API through the [`Transport`] trait so
//! tests can substitute canned responses. The real implementation wraps
//! a [`reqwest::Client`] configured with the run's timeout ceiling and
//! attaches the bearer credential to every request.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::common::{Error, Result, RunConfig};

use super::request::ResolvedRequest;
use super::response::ApiResponse;

/// Sends resolved requests and returns raw responses
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ResolvedRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport against the live API
pub struct HttpTransport {
    client: reqwest::Client,
    token: String,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            token: config.token.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ResolvedRequest) -> Result<ApiResponse> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|_| Error::InvalidUrl(request.url.clone()))?;

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .bearer_auth(&self.token);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %request.url, "sending request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(self.timeout_secs)
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!(status, bytes = body.len(), "received response");

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
