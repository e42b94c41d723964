//! Discord message assembly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::DestinationConfig;
use crate::enrich::{mention_text, parse_color};
use crate::error::DispatchResult;
use crate::events::NotificationEvent;
use crate::payload::{keys, EventPayload, PayloadValue};

// =============================================================================
// Discord API types
// =============================================================================

/// Body of a Discord execute-webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    /// Plain text sent with the embed; carries the mention.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub embeds: Vec<Embed>,
}

/// The single rich embed of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RGB value; unset means the channel default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

/// Render an enriched payload into the message for `config`.
///
/// # Errors
///
/// - [`DispatchError::MissingField`] if the payload lacks a field its kind's
///   rendering rule reads.
/// - [`DispatchError::Format`] if the configured embed color is malformed.
///
/// [`DispatchError::MissingField`]: crate::DispatchError::MissingField
/// [`DispatchError::Format`]: crate::DispatchError::Format
pub fn render(
    config: &DestinationConfig,
    payload: &EventPayload,
) -> DispatchResult<WebhookMessage> {
    let event = NotificationEvent::from_payload(payload)?;
    render_event(config, &event, payload)
}

/// Render an already converted event. `payload` supplies the timestamp and
/// thumbnail, which are not part of any rendering rule.
///
/// # Errors
///
/// Returns [`DispatchError::Format`] if the configured embed color is
/// malformed.
///
/// [`DispatchError::Format`]: crate::DispatchError::Format
pub fn render_event(
    config: &DestinationConfig,
    event: &NotificationEvent,
    payload: &EventPayload,
) -> DispatchResult<WebhookMessage> {
    let color = config.embed_color().map(parse_color).transpose()?;

    let embed = Embed {
        title: event.title(),
        description: event.description(),
        color,
        timestamp: event_timestamp(payload),
        thumbnail: thumbnail_url(payload).map(|url| EmbedThumbnail { url }),
    };

    Ok(WebhookMessage {
        content: mention_text(config.mention_type).to_string(),
        username: config.username().map(str::to_string),
        avatar_url: config.avatar_url().map(str::to_string),
        embeds: vec![embed],
    })
}

fn event_timestamp(payload: &EventPayload) -> Option<DateTime<Utc>> {
    let value = payload.get(keys::UTC_TIMESTAMP)?;
    let timestamp = value.as_timestamp();
    if timestamp.is_none() {
        debug!(value = %value, "Ignoring UtcTimestamp that is not a timestamp");
    }
    timestamp
}

fn thumbnail_url(payload: &EventPayload) -> Option<String> {
    payload
        .get(keys::ITEM)
        .and_then(PayloadValue::as_item)
        .and_then(|item| item.primary_remote_image())
        .map(str::to_string)
}
