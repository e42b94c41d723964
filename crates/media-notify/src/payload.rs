//! Dynamic event payload handed over by the event-subscription layer.
//!
//! The payload is a flat map from field name to a loosely typed value. It is
//! owned by exactly one dispatch: the enricher writes destination fields into
//! it and the renderer converts it into a typed [`NotificationEvent`].
//!
//! [`NotificationEvent`]: crate::events::NotificationEvent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::error::{DispatchError, DispatchResult};

/// Well-known payload keys.
pub mod keys {
    pub const NOTIFICATION_TYPE: &str = "NotificationType";
    pub const NOTIFICATION_USERNAME: &str = "NotificationUsername";
    pub const CLIENT: &str = "Client";
    pub const CLIENT_NAME: &str = "ClientName";
    pub const DEVICE_NAME: &str = "DeviceName";
    pub const NAME: &str = "Name";
    pub const OVERVIEW: &str = "Overview";
    pub const UTC_TIMESTAMP: &str = "UtcTimestamp";
    pub const ITEM: &str = "item";
    pub const USER_ID: &str = "UserId";
    pub const ITEM_TYPE: &str = "ItemType";

    // Written by the enricher
    pub const MENTION_TYPE: &str = "MentionType";
    pub const EMBED_COLOR: &str = "EmbedColor";
    pub const AVATAR_URL: &str = "AvatarUrl";
    pub const USERNAME: &str = "Username";
    pub const BOT_USERNAME: &str = "BotUsername";
}

/// A single payload value.
///
/// Deserialized JSON strings always stay [`PayloadValue::Text`] so they
/// render verbatim; [`as_timestamp`](Self::as_timestamp) and
/// [`as_guid`](Self::as_guid) parse them on demand. Arrays must be tried
/// before [`PayloadValue::Item`], which would otherwise accept a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    #[serde(skip_deserializing)]
    Timestamp(DateTime<Utc>),
    #[serde(skip_deserializing)]
    Guid(Uuid),
    Text(String),
    List(Vec<PayloadValue>),
    Item(MediaItem),
}

impl PayloadValue {
    /// Borrow the value as a string, if it is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a UTC timestamp.
    ///
    /// Text values are accepted when they parse as RFC 3339.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Interpret the value as a GUID.
    #[must_use]
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(id) => Some(*id),
            Self::Text(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_item(&self) -> Option<&MediaItem> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Guid(id) => write!(f, "{id}"),
            Self::Text(s) => f.write_str(s),
            Self::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            Self::Item(item) => f.write_str(item.name.as_deref().unwrap_or_default()),
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for PayloadValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for PayloadValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Uuid> for PayloadValue {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl From<MediaItem> for PayloadValue {
    fn from(value: MediaItem) -> Self {
        Self::Item(value)
    }
}

/// Reference to the library item an event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub image_infos: Vec<ImageInfo>,
}

impl MediaItem {
    /// Path of the first remote primary image, used as the embed thumbnail.
    #[must_use]
    pub fn primary_remote_image(&self) -> Option<&str> {
        self.image_infos
            .iter()
            .find(|image| !image.is_local_file && image.image_type == ImageType::Primary)
            .map(|image| image.path.as_str())
    }
}

/// Image attached to a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageInfo {
    pub path: String,
    #[serde(rename = "Type")]
    pub image_type: ImageType,
    #[serde(default)]
    pub is_local_file: bool,
}

impl ImageInfo {
    /// A remote image (not stored on the server's disk).
    #[must_use]
    pub fn remote(path: impl Into<String>, image_type: ImageType) -> Self {
        Self {
            path: path.into(),
            image_type,
            is_local_file: false,
        }
    }

    /// An image stored on the server's disk.
    #[must_use]
    pub fn local(path: impl Into<String>, image_type: ImageType) -> Self {
        Self {
            path: path.into(),
            image_type,
            is_local_file: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    Primary,
    Art,
    Backdrop,
    Banner,
    Logo,
    Thumb,
    Disc,
    Box,
    Screenshot,
    Menu,
    Chapter,
    BoxRear,
    Profile,
}

/// Field map describing one media-server event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(HashMap<String, PayloadValue>);

impl EventPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PayloadValue>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render a required field as text.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingField`] when the key is absent.
    pub fn text(&self, key: &'static str) -> DispatchResult<String> {
        self.get(key)
            .map(ToString::to_string)
            .ok_or(DispatchError::MissingField(key))
    }

    /// The raw `NotificationType` string, if present.
    #[must_use]
    pub fn notification_type(&self) -> Option<&str> {
        self.get(keys::NOTIFICATION_TYPE).and_then(PayloadValue::as_str)
    }
}

impl From<HashMap<String, PayloadValue>> for EventPayload {
    fn from(fields: HashMap<String, PayloadValue>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<PayloadValue>> FromIterator<(K, V)> for EventPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
