//! Discord webhook notifications for media server events.
//!
//! The media server hands over each event as a flat field map
//! ([`EventPayload`]). For every configured destination this crate checks
//! the destination, asks the send gate whether the event is wanted, adds the
//! destination's presentation fields, renders a single Discord embed and
//! posts it to the webhook.
//!
//! # Usage
//!
//! ```no_run
//! use media_notify::{DestinationConfig, DiscordClient, EventPayload, MentionType};
//!
//! # async fn run() -> Result<(), media_notify::DispatchError> {
//! let client = DiscordClient::new();
//! let destination = DestinationConfig::new("https://discord.com/api/webhooks/1/token")
//!     .with_embed_color("#00A4DC")
//!     .with_mention_type(MentionType::Here);
//!
//! let payload = EventPayload::new()
//!     .with("NotificationType", "ItemAdded")
//!     .with("Name", "Movie X")
//!     .with("Overview", "Something happens.");
//!
//! client.send(&destination, payload).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Setup and payload defects ([`DispatchError`]) abort the dispatch and reach
//! the caller. Delivery failures ([`TransportError`]) are logged as warnings
//! and swallowed, so one broken webhook never stalls the event pipeline.
//!
//! # Configuration
//!
//! Destinations come from a TOML file (see [`NotifyConfig::load`]) or from
//! environment variables:
//!
//! - `DISCORD_WEBHOOK_URL`: Discord webhook URL (enables the destination)
//! - `DISCORD_WEBHOOK_NAME`, `DISCORD_USERNAME`, `DISCORD_AVATAR_URL`
//! - `DISCORD_EMBED_COLOR`: `#RRGGBB`
//! - `DISCORD_MENTION_TYPE`: `none`, `everyone` or `here`
//! - `DISCORD_NOTIFICATION_TYPES`: comma separated kinds, empty for all
//! - `NOTIFY_DISABLED`: set to "true" to disable all notifications

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod events;
pub mod gate;
pub mod message;
pub mod notifier;
pub mod payload;
pub mod transport;

pub use client::DiscordClient;
pub use config::{DestinationConfig, MentionType, NotifyConfig};
pub use enrich::{mention_text, parse_color, prepare, Preparation};
pub use error::{DispatchError, DispatchResult, TransportError};
pub use events::{NotificationEvent, NotificationKind};
pub use gate::{AllowAll, ConfigGate, SendGate};
pub use message::{render, render_event, Embed, EmbedThumbnail, WebhookMessage};
pub use notifier::Notifier;
pub use payload::{EventPayload, ImageInfo, ImageType, MediaItem, PayloadValue};
pub use transport::{ReqwestTransport, WebhookTransport};
