//! Notification kinds and the typed events rendered from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DispatchError, DispatchResult};
use crate::payload::{keys, EventPayload};

/// Every kind of notification the media server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    ItemAdded,
    Generic,
    PlaybackStart,
    PlaybackProgress,
    PlaybackStop,
    SubtitleDownloadFailure,
    AuthenticationFailure,
    AuthenticationSuccess,
    SessionStart,
    PendingRestart,
    TaskCompleted,
    PluginInstallationCancelled,
    PluginInstallationFailed,
    PluginInstalled,
    PluginInstalling,
    PluginUninstalled,
    PluginUpdated,
    UserCreated,
    UserDeleted,
    UserLockedOut,
    UserPasswordChanged,
    UserUpdated,
    UserDataSaved,
}

impl NotificationKind {
    pub const ALL: [Self; 23] = [
        Self::ItemAdded,
        Self::Generic,
        Self::PlaybackStart,
        Self::PlaybackProgress,
        Self::PlaybackStop,
        Self::SubtitleDownloadFailure,
        Self::AuthenticationFailure,
        Self::AuthenticationSuccess,
        Self::SessionStart,
        Self::PendingRestart,
        Self::TaskCompleted,
        Self::PluginInstallationCancelled,
        Self::PluginInstallationFailed,
        Self::PluginInstalled,
        Self::PluginInstalling,
        Self::PluginUninstalled,
        Self::PluginUpdated,
        Self::UserCreated,
        Self::UserDeleted,
        Self::UserLockedOut,
        Self::UserPasswordChanged,
        Self::UserUpdated,
        Self::UserDataSaved,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ItemAdded => "ItemAdded",
            Self::Generic => "Generic",
            Self::PlaybackStart => "PlaybackStart",
            Self::PlaybackProgress => "PlaybackProgress",
            Self::PlaybackStop => "PlaybackStop",
            Self::SubtitleDownloadFailure => "SubtitleDownloadFailure",
            Self::AuthenticationFailure => "AuthenticationFailure",
            Self::AuthenticationSuccess => "AuthenticationSuccess",
            Self::SessionStart => "SessionStart",
            Self::PendingRestart => "PendingRestart",
            Self::TaskCompleted => "TaskCompleted",
            Self::PluginInstallationCancelled => "PluginInstallationCancelled",
            Self::PluginInstallationFailed => "PluginInstallationFailed",
            Self::PluginInstalled => "PluginInstalled",
            Self::PluginInstalling => "PluginInstalling",
            Self::PluginUninstalled => "PluginUninstalled",
            Self::PluginUpdated => "PluginUpdated",
            Self::UserCreated => "UserCreated",
            Self::UserDeleted => "UserDeleted",
            Self::UserLockedOut => "UserLockedOut",
            Self::UserPasswordChanged => "UserPasswordChanged",
            Self::UserUpdated => "UserUpdated",
            Self::UserDataSaved => "UserDataSaved",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no [`NotificationKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown notification type {:?}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for NotificationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A notification with exactly the fields its rendering rule reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    SessionStart {
        username: String,
        client: String,
        device_name: String,
    },
    PlaybackStart {
        username: String,
        item_name: String,
        client_name: String,
        device_name: String,
    },
    PlaybackStop {
        username: String,
        item_name: String,
        client_name: String,
        device_name: String,
    },
    UserLockedOut {
        username: String,
    },
    UserCreated {
        username: String,
    },
    UserDeleted {
        username: String,
    },
    PendingRestart,
    ItemAdded {
        name: String,
        overview: String,
    },
    /// Any kind without a rendering rule, including names we do not recognise.
    Other {
        kind: String,
    },
}

impl NotificationEvent {
    /// Convert a dynamic payload into the typed event for its kind.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingField`] when the payload has no
    /// `NotificationType`, or when the kind has a rendering rule and one of
    /// the fields that rule reads is absent.
    pub fn from_payload(payload: &EventPayload) -> DispatchResult<Self> {
        let raw = payload.text(keys::NOTIFICATION_TYPE)?;
        let Ok(kind) = raw.parse::<NotificationKind>() else {
            return Ok(Self::Other { kind: raw });
        };

        let event = match kind {
            NotificationKind::SessionStart => Self::SessionStart {
                username: payload.text(keys::NOTIFICATION_USERNAME)?,
                client: payload.text(keys::CLIENT)?,
                device_name: payload.text(keys::DEVICE_NAME)?,
            },
            NotificationKind::PlaybackStart => Self::PlaybackStart {
                username: payload.text(keys::NOTIFICATION_USERNAME)?,
                item_name: payload.text(keys::NAME)?,
                client_name: payload.text(keys::CLIENT_NAME)?,
                device_name: payload.text(keys::DEVICE_NAME)?,
            },
            NotificationKind::PlaybackStop => Self::PlaybackStop {
                username: payload.text(keys::NOTIFICATION_USERNAME)?,
                item_name: payload.text(keys::NAME)?,
                client_name: payload.text(keys::CLIENT_NAME)?,
                device_name: payload.text(keys::DEVICE_NAME)?,
            },
            NotificationKind::UserLockedOut => Self::UserLockedOut {
                username: payload.text(keys::NOTIFICATION_USERNAME)?,
            },
            NotificationKind::UserCreated => Self::UserCreated {
                username: payload.text(keys::NOTIFICATION_USERNAME)?,
            },
            NotificationKind::UserDeleted => Self::UserDeleted {
                username: payload.text(keys::NOTIFICATION_USERNAME)?,
            },
            NotificationKind::PendingRestart => Self::PendingRestart,
            NotificationKind::ItemAdded => Self::ItemAdded {
                name: payload.text(keys::NAME)?,
                overview: payload.text(keys::OVERVIEW)?,
            },
            other => Self::Other {
                kind: other.to_string(),
            },
        };

        Ok(event)
    }

    /// Embed title, or `None` for kinds without a rule.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        let title = match self {
            Self::SessionStart {
                username,
                client,
                device_name,
            } => format!("Session started by {username} on {client}({device_name})"),
            Self::PlaybackStart {
                username,
                item_name,
                client_name,
                device_name,
            } => format!("{username} is playing {item_name} on {client_name}({device_name})"),
            Self::PlaybackStop {
                username,
                item_name,
                client_name,
                device_name,
            } => format!(
                "{username} stopped playing {item_name} on {client_name}({device_name})"
            ),
            Self::UserLockedOut { username } => format!("User {username} has been locked out"),
            Self::UserCreated { username } => format!("User {username} has been created"),
            Self::UserDeleted { username } => format!("User {username} has been deleted"),
            Self::PendingRestart => "Server pending restart".to_string(),
            Self::ItemAdded { name, .. } => format!("New content: {name}"),
            Self::Other { .. } => return None,
        };

        Some(title)
    }

    /// Embed description; only new content carries one.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        match self {
            Self::ItemAdded { overview, .. } => Some(overview.clone()),
            _ => None,
        }
    }

    /// Kind name, for logging.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::SessionStart { .. } => NotificationKind::SessionStart.as_str(),
            Self::PlaybackStart { .. } => NotificationKind::PlaybackStart.as_str(),
            Self::PlaybackStop { .. } => NotificationKind::PlaybackStop.as_str(),
            Self::UserLockedOut { .. } => NotificationKind::UserLockedOut.as_str(),
            Self::UserCreated { .. } => NotificationKind::UserCreated.as_str(),
            Self::UserDeleted { .. } => NotificationKind::UserDeleted.as_str(),
            Self::PendingRestart => NotificationKind::PendingRestart.as_str(),
            Self::ItemAdded { .. } => NotificationKind::ItemAdded.as_str(),
            Self::Other { kind } => kind,
        }
    }
}
