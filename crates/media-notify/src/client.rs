//! Discord webhook client: prepare, render and deliver one event.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::DestinationConfig;
use crate::enrich::{prepare, Preparation};
use crate::error::DispatchResult;
use crate::gate::{ConfigGate, SendGate};
use crate::events::NotificationEvent;
use crate::message::{render_event, WebhookMessage};
use crate::payload::EventPayload;
use crate::transport::{ReqwestTransport, WebhookTransport};

/// Sends media-server events to Discord webhooks.
///
/// The client holds no per-destination state, so one instance can serve any
/// number of destinations and concurrent dispatches.
#[derive(Clone)]
pub struct DiscordClient {
    transport: Arc<dyn WebhookTransport>,
    gate: Arc<dyn SendGate>,
}

impl DiscordClient {
    /// Client posting over HTTP and gating on each destination's switches.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    #[must_use]
    pub fn with_transport(transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            transport,
            gate: Arc::new(ConfigGate),
        }
    }

    /// Replace the send gate.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<dyn SendGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Send one event to one destination.
    ///
    /// Returns `Ok(())` when the message was delivered, when the gate skipped
    /// the event, and when delivery failed at the transport level. Transport
    /// failures are logged as warnings and never retried.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Configuration`] if the destination has no webhook URI.
    /// - [`DispatchError::Format`] if the configured embed color is malformed.
    /// - [`DispatchError::MissingField`] if the payload lacks a field its
    ///   kind's rendering rule reads.
    ///
    /// [`DispatchError::Configuration`]: crate::DispatchError::Configuration
    /// [`DispatchError::Format`]: crate::DispatchError::Format
    /// [`DispatchError::MissingField`]: crate::DispatchError::MissingField
    pub async fn send(
        &self,
        config: &DestinationConfig,
        mut payload: EventPayload,
    ) -> DispatchResult<()> {
        let destination = config.webhook_name.as_str();

        if prepare(config, &mut payload, self.gate.as_ref())? == Preparation::Skip {
            debug!(destination, "Event gated off, nothing sent");
            return Ok(());
        }

        let event = NotificationEvent::from_payload(&payload)?;
        let message = render_event(config, &event, &payload)?;
        self.deliver(config, event.kind_name(), &message).await;
        Ok(())
    }

    /// Post the message, swallowing transport failures.
    async fn deliver(&self, config: &DestinationConfig, kind: &str, message: &WebhookMessage) {
        let destination = config.webhook_name.as_str();
        let title = message.embeds.first().and_then(|e| e.title.as_deref());

        debug!(destination, kind, title, "Sending notification");

        match self.transport.post(&config.webhook_uri, message).await {
            Ok(()) => debug!(destination, kind, "Notification sent"),
            Err(e) => warn!(destination, kind, error = %e, "Error sending notification"),
        }
    }

    /// Fire-and-forget [`send`](Self::send) on a tokio task.
    ///
    /// Propagating errors are logged at error level; the returned handle only
    /// signals completion.
    pub fn spawn_send(
        &self,
        config: Arc<DestinationConfig>,
        payload: EventPayload,
    ) -> JoinHandle<()> {
        let client = self.clone();

        tokio::spawn(async move {
            if let Err(e) = client.send(&config, payload).await {
                error!(
                    destination = %config.webhook_name,
                    error = %e,
                    "Failed to dispatch notification"
                );
            }
        })
    }
}

impl Default for DiscordClient {
    fn default() -> Self {
        Self::new()
    }
}
