//! Destination configuration.
//!
//! A destination is one Discord webhook plus its presentation overrides and
//! the switches the send gate evaluates. Destinations are loaded from a TOML
//! file (one `[[destinations]]` table each) or from environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DispatchError, DispatchResult};
use crate::events::NotificationKind;

/// Environment variable for the Discord webhook URL.
const ENV_DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
const ENV_DISCORD_WEBHOOK_NAME: &str = "DISCORD_WEBHOOK_NAME";
const ENV_DISCORD_USERNAME: &str = "DISCORD_USERNAME";
const ENV_DISCORD_AVATAR_URL: &str = "DISCORD_AVATAR_URL";
const ENV_DISCORD_EMBED_COLOR: &str = "DISCORD_EMBED_COLOR";
const ENV_DISCORD_MENTION_TYPE: &str = "DISCORD_MENTION_TYPE";
/// Comma separated list of notification kinds to send.
const ENV_DISCORD_NOTIFICATION_TYPES: &str = "DISCORD_NOTIFICATION_TYPES";

const DEFAULT_WEBHOOK_NAME: &str = "discord";

/// Who gets pinged alongside a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MentionType {
    #[default]
    None,
    Everyone,
    Here,
}

impl std::str::FromStr for MentionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "everyone" => Ok(Self::Everyone),
            "here" => Ok(Self::Here),
            other => Err(format!("unknown mention type {other:?}")),
        }
    }
}

const fn enabled() -> bool {
    true
}

/// Configuration for a single Discord webhook destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationConfig {
    /// Label used in logs.
    #[serde(default = "default_webhook_name")]
    pub webhook_name: String,
    /// Discord execute-webhook URL. Required.
    #[serde(default)]
    pub webhook_uri: String,
    /// Overrides the webhook's display name.
    #[serde(default)]
    pub username: Option<String>,
    /// Overrides the webhook's avatar.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Accent color, `#RRGGBB`.
    #[serde(default)]
    pub embed_color: Option<String>,
    #[serde(default)]
    pub mention_type: MentionType,

    // Send gate switches
    #[serde(default = "enabled")]
    pub enable_webhook: bool,
    /// Kinds to send. Empty means every kind.
    #[serde(default)]
    pub notification_types: Vec<NotificationKind>,
    /// Users whose events are sent. Empty means every user.
    #[serde(default)]
    pub user_filter: Vec<Uuid>,
    #[serde(default = "enabled")]
    pub enable_movies: bool,
    #[serde(default = "enabled")]
    pub enable_episodes: bool,
    #[serde(default = "enabled")]
    pub enable_series: bool,
    #[serde(default = "enabled")]
    pub enable_seasons: bool,
    #[serde(default = "enabled")]
    pub enable_albums: bool,
    #[serde(default = "enabled")]
    pub enable_songs: bool,
    #[serde(default = "enabled")]
    pub enable_videos: bool,
}

fn default_webhook_name() -> String {
    DEFAULT_WEBHOOK_NAME.to_string()
}

/// Treat empty strings in optional settings as unset.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl DestinationConfig {
    /// A destination posting to `webhook_uri` with every switch enabled.
    #[must_use]
    pub fn new(webhook_uri: impl Into<String>) -> Self {
        Self {
            webhook_name: default_webhook_name(),
            webhook_uri: webhook_uri.into(),
            username: None,
            avatar_url: None,
            embed_color: None,
            mention_type: MentionType::None,
            enable_webhook: true,
            notification_types: Vec::new(),
            user_filter: Vec::new(),
            enable_movies: true,
            enable_episodes: true,
            enable_series: true,
            enable_seasons: true,
            enable_albums: true,
            enable_songs: true,
            enable_videos: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.webhook_name = name.into();
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    #[must_use]
    pub fn with_embed_color(mut self, color: impl Into<String>) -> Self {
        self.embed_color = Some(color.into());
        self
    }

    #[must_use]
    pub const fn with_mention_type(mut self, mention_type: MentionType) -> Self {
        self.mention_type = mention_type;
        self
    }

    #[must_use]
    pub fn with_notification_types(
        mut self,
        kinds: impl IntoIterator<Item = NotificationKind>,
    ) -> Self {
        self.notification_types = kinds.into_iter().collect();
        self
    }

    /// Check the settings every dispatch depends on.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the webhook URI is empty.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.webhook_uri.trim().is_empty() {
            return Err(DispatchError::Configuration(format!(
                "webhookUri is empty for destination {:?}",
                self.webhook_name
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        non_empty(self.username.as_ref())
    }

    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        non_empty(self.avatar_url.as_ref())
    }

    #[must_use]
    pub fn embed_color(&self) -> Option<&str> {
        non_empty(self.embed_color.as_ref())
    }

    /// Whether `kind` is in the enabled set.
    #[must_use]
    pub fn kind_enabled(&self, kind: NotificationKind) -> bool {
        self.notification_types.is_empty() || self.notification_types.contains(&kind)
    }

    /// Build a destination from `DISCORD_*` environment variables.
    ///
    /// Returns `Ok(None)` when `DISCORD_WEBHOOK_URL` is not set.
    ///
    /// # Errors
    ///
    /// Fails if the mention type or a notification type does not parse.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Fails if the mention type or a notification type does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let Some(webhook_uri) = lookup(ENV_DISCORD_WEBHOOK_URL) else {
            debug!("Discord notifications disabled (DISCORD_WEBHOOK_URL not set)");
            return Ok(None);
        };

        let mut config = Self::new(webhook_uri);

        if let Some(name) = lookup(ENV_DISCORD_WEBHOOK_NAME) {
            config.webhook_name = name;
        }
        config.username = lookup(ENV_DISCORD_USERNAME);
        config.avatar_url = lookup(ENV_DISCORD_AVATAR_URL);
        config.embed_color = lookup(ENV_DISCORD_EMBED_COLOR);

        if let Some(mention) = lookup(ENV_DISCORD_MENTION_TYPE) {
            config.mention_type = mention
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {ENV_DISCORD_MENTION_TYPE}"))?;
        }

        if let Some(types) = lookup(ENV_DISCORD_NOTIFICATION_TYPES) {
            config.notification_types = types
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<NotificationKind>)
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("Invalid {ENV_DISCORD_NOTIFICATION_TYPES}"))?;
        }

        Ok(Some(config))
    }
}

/// All configured destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
}

impl NotifyConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or unknown enum values.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse notification config")
    }

    /// Load a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    /// Configuration from environment variables: zero or one destination.
    ///
    /// # Errors
    ///
    /// See [`DestinationConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            destinations: DestinationConfig::from_env()?.into_iter().collect(),
        })
    }
}
