//! Payload validation and Discord-specific enrichment.

use crate::config::{DestinationConfig, MentionType};
use crate::error::{DispatchError, DispatchResult};
use crate::gate::SendGate;
use crate::payload::{keys, EventPayload};

/// Outcome of [`prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preparation {
    /// Payload was enriched and should be rendered and sent.
    Send,
    /// The gate declined this event for this destination.
    Skip,
}

/// Validate the destination, consult the gate and enrich the payload.
///
/// On [`Preparation::Send`] the payload additionally carries `MentionType`,
/// and `EmbedColor`, `AvatarUrl`, `Username` and `BotUsername` when the
/// destination configures them. Existing keys are overwritten, never removed.
///
/// # Errors
///
/// - [`DispatchError::Configuration`] if the webhook URI is empty.
/// - [`DispatchError::Format`] if a configured embed color is malformed.
pub fn prepare(
    config: &DestinationConfig,
    payload: &mut EventPayload,
    gate: &dyn SendGate,
) -> DispatchResult<Preparation> {
    config.validate()?;

    if !gate.should_send(config, payload) {
        return Ok(Preparation::Skip);
    }

    payload.insert(keys::MENTION_TYPE, mention_text(config.mention_type));

    if let Some(color) = config.embed_color() {
        payload.insert(keys::EMBED_COLOR, parse_color(color)?);
    }

    if let Some(avatar_url) = config.avatar_url() {
        payload.insert(keys::AVATAR_URL, avatar_url);
    }

    if let Some(username) = config.username() {
        payload.insert(keys::USERNAME, username);
        payload.insert(keys::BOT_USERNAME, username);
    }

    Ok(Preparation::Send)
}

/// Message text that triggers the configured mention.
#[must_use]
pub const fn mention_text(mention_type: MentionType) -> &'static str {
    match mention_type {
        MentionType::Everyone => "@everyone",
        MentionType::Here => "@here",
        MentionType::None => "",
    }
}

/// Parse a `#RRGGBB` color code into its RGB value.
///
/// The first character is a marker and is skipped whatever it is. The next
/// six characters must be hex digits; anything after them is ignored.
///
/// # Errors
///
/// Returns [`DispatchError::Format`] for empty input, fewer than six digits
/// after the marker or a non-hex digit.
pub fn parse_color(code: &str) -> DispatchResult<u32> {
    let format_error = |reason| DispatchError::Format {
        value: code.to_string(),
        reason,
    };

    let mut chars = code.chars();
    if chars.next().is_none() {
        return Err(format_error("empty color code"));
    }

    let digits: String = chars.take(6).collect();
    if digits.chars().count() < 6 {
        return Err(format_error("expected six hex digits after the marker"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format_error("not a hex color"));
    }

    u32::from_str_radix(&digits, 16).map_err(|_| format_error("not a hex color"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{AllowAll, ConfigGate};
    use crate::payload::PayloadValue;

    struct DenyAll;

    impl SendGate for DenyAll {
        fn should_send(&self, _config: &DestinationConfig, _payload: &EventPayload) -> bool {
            false
        }
    }

    fn item_added() -> EventPayload {
        EventPayload::new()
            .with(keys::NOTIFICATION_TYPE, "ItemAdded")
            .with(keys::NAME, "Movie X")
    }

    #[test]
    fn test_mention_text() {
        assert_eq!(mention_text(MentionType::Everyone), "@everyone");
        assert_eq!(mention_text(MentionType::Here), "@here");
        assert_eq!(mention_text(MentionType::None), "");
        assert_eq!(mention_text(MentionType::default()), "");
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#1A2B3C").unwrap(), 0x001A_2B3C);
        assert_eq!(parse_color("#ffffff").unwrap(), 0x00FF_FFFF);
        assert_eq!(parse_color("#000000").unwrap(), 0);
        assert_eq!(parse_color("#00A4DCFF").unwrap(), 0x0000_A4DC);
    }

    #[test]
    fn test_parse_color_rejects_malformed() {
        for bad in ["#ZZZZZZ", "#12345", "#", "", "#12 456", "#1A2B3é"] {
            assert!(
                matches!(parse_color(bad), Err(DispatchError::Format { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_prepare_rejects_missing_uri() {
        let mut payload = item_added();
        let result = prepare(&DestinationConfig::new(""), &mut payload, &AllowAll);
        assert!(matches!(result, Err(DispatchError::Configuration(_))));
        assert_eq!(payload, item_added());
    }

    #[test]
    fn test_prepare_skip_leaves_payload_untouched() {
        let config = DestinationConfig::new("https://discord.test/hook")
            .with_mention_type(MentionType::Here);
        let mut payload = item_added();

        assert_eq!(
            prepare(&config, &mut payload, &DenyAll).unwrap(),
            Preparation::Skip
        );
        assert_eq!(payload, item_added());
    }

    #[test]
    fn test_prepare_minimal_config_adds_empty_mention_only() {
        let config = DestinationConfig::new("https://discord.test/hook");
        let mut payload = item_added();

        assert_eq!(
            prepare(&config, &mut payload, &ConfigGate).unwrap(),
            Preparation::Send
        );
        assert_eq!(payload.get(keys::MENTION_TYPE), Some(&PayloadValue::from("")));
        for key in [
            keys::EMBED_COLOR,
            keys::AVATAR_URL,
            keys::USERNAME,
            keys::BOT_USERNAME,
        ] {
            assert!(!payload.contains_key(key), "{key} should not be set");
        }
    }

    #[test]
    fn test_prepare_full_config() {
        let config = DestinationConfig::new("https://discord.test/hook")
            .with_mention_type(MentionType::Everyone)
            .with_embed_color("#1A2B3C")
            .with_avatar_url("https://img.example/avatar.png")
            .with_username("Jellyfin");
        let mut payload = item_added().with(keys::USERNAME, "overwritten");

        assert_eq!(
            prepare(&config, &mut payload, &AllowAll).unwrap(),
            Preparation::Send
        );
        assert_eq!(
            payload.get(keys::MENTION_TYPE),
            Some(&PayloadValue::from("@everyone"))
        );
        assert_eq!(
            payload.get(keys::EMBED_COLOR),
            Some(&PayloadValue::from(0x001A_2B3C_u32))
        );
        assert_eq!(
            payload.get(keys::AVATAR_URL),
            Some(&PayloadValue::from("https://img.example/avatar.png"))
        );
        assert_eq!(payload.get(keys::USERNAME), Some(&PayloadValue::from("Jellyfin")));
        assert_eq!(
            payload.get(keys::BOT_USERNAME),
            Some(&PayloadValue::from("Jellyfin"))
        );
        assert_eq!(payload.get(keys::NAME), Some(&PayloadValue::from("Movie X")));
    }

    #[test]
    fn test_prepare_bad_color() {
        let config = DestinationConfig::new("https://discord.test/hook").with_embed_color("#ZZZZZZ");
        let mut payload = item_added();
        assert!(matches!(
            prepare(&config, &mut payload, &AllowAll),
            Err(DispatchError::Format { .. })
        ));
    }
}
