//! Send gating: decides whether a destination wants a given event.

use tracing::debug;

use crate::config::DestinationConfig;
use crate::events::NotificationKind;
use crate::payload::{keys, EventPayload, PayloadValue};

/// Decides per destination whether an event should be sent at all.
///
/// A `false` answer is not an error; the dispatch ends without sending.
pub trait SendGate: Send + Sync {
    fn should_send(&self, config: &DestinationConfig, payload: &EventPayload) -> bool;
}

/// Gate driven by the destination's own switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigGate;

impl ConfigGate {
    fn item_type_enabled(config: &DestinationConfig, item_type: &str) -> bool {
        match item_type {
            "Movie" => config.enable_movies,
            "Episode" => config.enable_episodes,
            "Series" => config.enable_series,
            "Season" => config.enable_seasons,
            "MusicAlbum" => config.enable_albums,
            "Audio" => config.enable_songs,
            "Video" => config.enable_videos,
            _ => true,
        }
    }
}

impl SendGate for ConfigGate {
    fn should_send(&self, config: &DestinationConfig, payload: &EventPayload) -> bool {
        let destination = config.webhook_name.as_str();

        if !config.enable_webhook {
            debug!(destination, "Webhook disabled, skipping");
            return false;
        }

        if !config.notification_types.is_empty() {
            let kind = payload
                .notification_type()
                .and_then(|raw| raw.parse::<NotificationKind>().ok());
            if !kind.is_some_and(|kind| config.kind_enabled(kind)) {
                debug!(
                    destination,
                    kind = payload.notification_type(),
                    "Notification type not enabled, skipping"
                );
                return false;
            }
        }

        if !config.user_filter.is_empty() {
            if let Some(user_id) = payload.get(keys::USER_ID).and_then(PayloadValue::as_guid) {
                if !config.user_filter.contains(&user_id) {
                    debug!(destination, %user_id, "User not in filter, skipping");
                    return false;
                }
            }
        }

        if let Some(item_type) = payload.get(keys::ITEM_TYPE).and_then(PayloadValue::as_str) {
            if !Self::item_type_enabled(config, item_type) {
                debug!(destination, item_type, "Item type disabled, skipping");
                return false;
            }
        }

        true
    }
}

/// Sends every event. Useful when the caller has already filtered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl SendGate for AllowAll {
    fn should_send(&self, _config: &DestinationConfig, _payload: &EventPayload) -> bool {
        true
    }
}
