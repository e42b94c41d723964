//! Delivery of rendered messages to a webhook endpoint.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::TransportError;
use crate::message::WebhookMessage;

/// Default request timeout for webhook posts.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Seconds to wait when a 429 carries no usable `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Posts one message to one webhook URI.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Deliver `message` to `webhook_uri` in a single request.
    async fn post(&self, webhook_uri: &str, message: &WebhookMessage)
        -> Result<(), TransportError>;
}

/// [`WebhookTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Reuse an existing client (connection pool, proxies, TLS settings).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post(
        &self,
        webhook_uri: &str,
        message: &WebhookMessage,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(webhook_uri)
            .timeout(self.timeout)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "discord", %status, "Webhook accepted message");
            return Ok(());
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            return Err(TransportError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();
        debug!(
            channel = "discord",
            status = %status,
            body = %body,
            "Discord webhook rejected message"
        );

        Err(TransportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
