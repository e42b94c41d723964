//! Fan-out of one event to every configured destination.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::DiscordClient;
use crate::config::{DestinationConfig, NotifyConfig};
use crate::error::DispatchError;
use crate::payload::EventPayload;

/// Environment variable to disable all notifications.
const ENV_NOTIFY_DISABLED: &str = "NOTIFY_DISABLED";

/// Central notification dispatcher.
///
/// Each destination gets its own copy of the payload and its own dispatch,
/// so one destination failing never affects the others.
pub struct Notifier {
    client: DiscordClient,
    destinations: Vec<Arc<DestinationConfig>>,
    disabled: bool,
}

impl Notifier {
    /// Create a notifier for the given destinations.
    #[must_use]
    pub fn new(client: DiscordClient, config: NotifyConfig) -> Self {
        if config.destinations.is_empty() {
            warn!("No notification destinations configured");
        } else {
            info!(
                destination_count = config.destinations.len(),
                "Notification system initialized"
            );
        }

        Self {
            client,
            destinations: config.destinations.into_iter().map(Arc::new).collect(),
            disabled: false,
        }
    }

    /// Create a notifier from environment variables.
    ///
    /// Honours `NOTIFY_DISABLED` (`true` or `1`) and otherwise reads one
    /// destination from the `DISCORD_*` variables.
    ///
    /// # Errors
    ///
    /// Fails if a `DISCORD_*` variable holds an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        let disabled = std::env::var(ENV_NOTIFY_DISABLED)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        if disabled {
            info!("Notifications disabled via NOTIFY_DISABLED");
            return Ok(Self::disabled());
        }

        Ok(Self::new(DiscordClient::new(), NotifyConfig::from_env()?))
    }

    /// Create a disabled notifier (for testing or when notifications are off).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: DiscordClient::new(),
            destinations: vec![],
            disabled: true,
        }
    }

    /// Check if any destination would receive events.
    #[must_use]
    pub fn has_destinations(&self) -> bool {
        !self.disabled && !self.destinations.is_empty()
    }

    #[must_use]
    pub fn destination_count(&self) -> usize {
        if self.disabled {
            0
        } else {
            self.destinations.len()
        }
    }

    /// Send an event to all destinations (fire-and-forget).
    ///
    /// Spawns one task per destination and returns immediately. Errors are
    /// logged but not propagated to the caller.
    pub fn notify(&self, payload: &EventPayload) {
        if !self.has_destinations() {
            debug!("No active destinations, skipping event");
            return;
        }

        for destination in &self.destinations {
            self.client
                .spawn_send(Arc::clone(destination), payload.clone());
        }
    }

    /// Send an event to all destinations and wait for every dispatch.
    ///
    /// Dispatches run concurrently. Returns each destination's name with its
    /// outcome; transport failures show up as `Ok(())` since the client
    /// swallows them.
    pub async fn notify_and_wait(
        &self,
        payload: &EventPayload,
    ) -> Vec<(String, Result<(), DispatchError>)> {
        if !self.has_destinations() {
            return vec![];
        }

        let sends = self.destinations.iter().map(|destination| {
            let payload = payload.clone();
            async move {
                let result = self.client.send(destination, payload).await;
                (destination.webhook_name.clone(), result)
            }
        });

        join_all(sends).await
    }
}
