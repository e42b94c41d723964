//! Integration tests for Discord webhook delivery.
//!
//! A wiremock server stands in for the Discord execute-webhook endpoint.

use media_notify::{
    DestinationConfig, DiscordClient, DispatchError, EventPayload, ImageInfo, ImageType,
    MediaItem, MentionType, NotificationKind, ReqwestTransport, TransportError, WebhookMessage,
    WebhookTransport,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::Level;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBHOOK_PATH: &str = "/api/webhooks/1/token";

// =============================================================================
// Helpers
// =============================================================================

/// Counts warning-level events on the current thread.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings() -> (Arc<AtomicUsize>, tracing::subscriber::DefaultGuard) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
    let guard = tracing::subscriber::set_default(subscriber);
    (count, guard)
}

/// Records the `destination` and `kind` fields of warning-level events.
#[derive(Clone, Default)]
struct WarnFields(Arc<Mutex<Vec<(String, String)>>>);

#[derive(Default)]
struct FieldVisitor {
    destination: String,
    kind: String,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "destination" => self.destination = value.to_string(),
            "kind" => self.kind = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: tracing::Subscriber> Layer<S> for WarnFields {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.0
                .lock()
                .unwrap()
                .push((visitor.destination, visitor.kind));
        }
    }
}

fn destination(server: &MockServer) -> DestinationConfig {
    DestinationConfig::new(format!("{}{WEBHOOK_PATH}", server.uri())).with_name("test")
}

fn item_added() -> EventPayload {
    EventPayload::new()
        .with("NotificationType", "ItemAdded")
        .with("Name", "Movie X")
        .with("Overview", "Something happens.")
}

fn client() -> DiscordClient {
    DiscordClient::with_transport(Arc::new(
        ReqwestTransport::new().with_timeout(Duration::from_secs(5)),
    ))
}

// =============================================================================
// Delivery
// =============================================================================

#[tokio::test]
async fn test_item_added_is_posted_as_single_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = destination(&server)
        .with_username("Jellyfin")
        .with_avatar_url("https://img.example/avatar.png")
        .with_embed_color("#1A2B3C")
        .with_mention_type(MentionType::Everyone);
    let payload = item_added()
        .with("UtcTimestamp", "2024-05-01T12:30:00Z")
        .with(
            "item",
            MediaItem {
                name: Some("Movie X".to_string()),
                image_infos: vec![
                    ImageInfo::local("/srv/poster.jpg", ImageType::Primary),
                    ImageInfo::remote("https://img.example/poster.jpg", ImageType::Primary),
                ],
            },
        );

    client().send(&config, payload).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "content": "@everyone",
            "username": "Jellyfin",
            "avatar_url": "https://img.example/avatar.png",
            "embeds": [{
                "title": "New content: Movie X",
                "description": "Something happens.",
                "color": 0x001A_2B3C,
                "timestamp": "2024-05-01T12:30:00Z",
                "thumbnail": { "url": "https://img.example/poster.jpg" }
            }]
        })
    );
}

#[tokio::test]
async fn test_playback_start_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .and(body_partial_json(json!({
            "embeds": [{ "title": "erin is playing Movie X on Jellyfin Web(Firefox)" }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let payload = EventPayload::new()
        .with("NotificationType", "PlaybackStart")
        .with("NotificationUsername", "erin")
        .with("Name", "Movie X")
        .with("ClientName", "Jellyfin Web")
        .with("DeviceName", "Firefox");

    client().send(&destination(&server), payload).await.unwrap();
}

// =============================================================================
// Transport failures are swallowed
// =============================================================================

#[tokio::test]
async fn test_server_error_is_logged_once_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let (warnings, _guard) = count_warnings();

    let result = client().send(&destination(&server), item_added()).await;

    assert!(result.is_ok());
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failure_warning_names_destination_and_kind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let fields = WarnFields::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(fields.clone()));

    client()
        .send(&destination(&server), item_added())
        .await
        .unwrap();

    let recorded = fields.0.lock().unwrap().clone();
    assert_eq!(
        recorded,
        vec![("test".to_string(), "ItemAdded".to_string())]
    );
}

#[tokio::test]
async fn test_rate_limit_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
        .expect(1)
        .mount(&server)
        .await;

    let (warnings, _guard) = count_warnings();

    assert!(client().send(&destination(&server), item_added()).await.is_ok());
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_swallowed() {
    let (warnings, _guard) = count_warnings();

    // Nothing listens on the discard port
    let config = DestinationConfig::new("http://127.0.0.1:9/api/webhooks/1/token");
    let result = client().send(&config, item_added()).await;

    assert!(result.is_ok());
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Propagating errors never reach the endpoint
// =============================================================================

#[tokio::test]
async fn test_missing_field_propagates_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let payload = EventPayload::new()
        .with("NotificationType", "SessionStart")
        .with("NotificationUsername", "frank");

    let err = client()
        .send(&destination(&server), payload)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::MissingField("Client")));
}

#[tokio::test]
async fn test_malformed_color_propagates_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let config = destination(&server).with_embed_color("#ZZZZZZ");
    let err = client().send(&config, item_added()).await.unwrap_err();
    assert!(matches!(err, DispatchError::Format { .. }));
}

#[tokio::test]
async fn test_gated_kind_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let config =
        destination(&server).with_notification_types([NotificationKind::PlaybackStart]);
    client().send(&config, item_added()).await.unwrap();
}

// =============================================================================
// Transport outcomes
// =============================================================================

fn empty_message() -> WebhookMessage {
    WebhookMessage {
        content: String::new(),
        username: None,
        avatar_url: None,
        embeds: vec![],
    }
}

#[tokio::test]
async fn test_transport_reports_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "12"))
        .mount(&server)
        .await;

    let err = ReqwestTransport::new()
        .post(&format!("{}{WEBHOOK_PATH}", server.uri()), &empty_message())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransportError::RateLimited {
            retry_after_secs: 12
        }
    ));
}

#[tokio::test]
async fn test_transport_reports_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Cannot send an empty message"))
        .mount(&server)
        .await;

    let err = ReqwestTransport::new()
        .post(&format!("{}{WEBHOOK_PATH}", server.uri()), &empty_message())
        .await
        .unwrap_err();

    match err {
        TransportError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Cannot send an empty message");
        }
        other => panic!("unexpected error: {other}"),
    }
}
