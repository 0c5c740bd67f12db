//! Mandrill adapter tests.

use courier::providers::MandrillProvider;
use courier::{Attachment, Email, HttpTransport, MailError, Message, MimeMessage, Provider, Settings};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn provider(server: &MockServer) -> MandrillProvider {
    MandrillProvider::new("1234", Arc::new(HttpTransport::new())).base_url(server.uri())
}

fn valid_email() -> Email {
    Email::new()
        .from(("T Stark", "tony.stark@example.com"))
        .to(("Steve Rogers", "steve.rogers@example.com"))
        .subject("Hello, Avengers!")
        .html_body("<h1>Hello</h1>")
        .text_body("Hello")
}

fn payload(email: &Email, settings: &Settings) -> Value {
    let provider = MandrillProvider::new("1234", Arc::new(courier::testing::RecordingTransport::new()));
    let message = Message::new(email, settings);
    serde_json::to_value(provider.mandrill_message(&message)).unwrap()
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([
        {"email": "steve.rogers@example.com", "status": "sent", "_id": "abc123"}
    ]))
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn successful_delivery_returns_raw_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(header("User-Agent", format!("courier/{}", courier::VERSION)))
        .and(body_json(json!({
            "key": "1234",
            "async": false,
            "message": {
                "important": false,
                "from_email": "tony.stark@example.com",
                "from_name": "T Stark",
                "headers": {},
                "html": "<h1>Hello</h1>",
                "subject": "Hello, Avengers!",
                "tags": [],
                "text": "Hello",
                "to": [{"email": "steve.rogers@example.com", "name": "Steve Rogers", "type": "to"}]
            }
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let settings = Settings::default();
    let email = valid_email();
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    let response = provider.send(payload).await.unwrap();
    assert_eq!(response[0]["_id"], "abc123");
}

#[tokio::test]
async fn async_flag_is_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(wiremock::matchers::body_partial_json(json!({"async": true})))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        api_key: Some("1234".into()),
        async_send: true,
        ..Settings::default()
    };
    let provider = MandrillProvider::from_settings(&settings, Arc::new(HttpTransport::new()))
        .unwrap()
        .base_url(server.uri());
    let email = valid_email();
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    provider.send(payload).await.unwrap();
}

#[tokio::test]
async fn error_response_maps_to_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Key",
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let settings = Settings::default();
    let email = valid_email();
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    let err = provider.send(payload).await.unwrap_err();
    match err {
        MailError::ProviderError {
            provider,
            message,
            status,
        } => {
            assert_eq!(provider, "mandrill");
            assert_eq!(message, "Invalid API key");
            assert_eq!(status, Some(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Payload Tests
// ============================================================================

#[test]
fn recipients_carry_their_type() {
    let email = Email::new()
        .to("name1@domain.tld")
        .to("Name 2 <name2@domain.tld>")
        .cc("name3@domain.tld")
        .bcc("name4@domain.tld");

    assert_eq!(
        payload(&email, &Settings::default())["to"],
        json!([
            {"email": "name1@domain.tld", "name": null, "type": "to"},
            {"email": "name2@domain.tld", "name": "Name 2", "type": "to"},
            {"email": "name3@domain.tld", "name": null, "type": "cc"},
            {"email": "name4@domain.tld", "name": null, "type": "bcc"}
        ])
    );
}

#[test]
fn tri_state_options_follow_message_then_settings() {
    let settings = Settings {
        track_clicks: Some(true),
        auto_text: Some(false),
        ..Settings::default()
    };
    let email = Email::new().option("inline_css", false).option("track_clicks", false);
    let payload = payload(&email, &settings);

    assert_eq!(payload["inline_css"], json!(false));
    assert_eq!(payload["track_clicks"], json!(false));
    assert_eq!(payload["auto_text"], json!(false));
    assert!(payload.get("auto_html").is_none());
    assert!(payload.get("track_opens").is_none());
    assert!(payload.get("url_strip_qs").is_none());
    assert!(payload.get("view_content_link").is_none());
}

#[test]
fn renamed_options() {
    let settings = Settings {
        track_url_without_query_string: Some(true),
        log_content: Some(true),
        important: Some(true),
        ..Settings::default()
    };
    let payload = payload(&Email::new(), &settings);

    assert_eq!(payload["url_strip_qs"], json!(true));
    assert_eq!(payload["view_content_link"], json!(true));
    assert_eq!(payload["important"], json!(true));
}

#[test]
fn string_options_only_when_set() {
    let settings = Settings {
        subaccount: Some("abc123".into()),
        ..Settings::default()
    };
    let email = Email::new().option("signing_domain", "example.com");
    let payload = payload(&email, &settings);

    assert_eq!(payload["subaccount"], json!("abc123"));
    assert_eq!(payload["signing_domain"], json!("example.com"));
    assert!(payload.get("bcc_address").is_none());
    assert!(payload.get("return_path_domain").is_none());
    assert!(payload.get("tracking_domain").is_none());
}

#[test]
fn reply_to_header_wins_over_settings() {
    let settings = Settings {
        reply_to: Some("bart@simpsons.com".into()),
        ..Settings::default()
    };

    let email = Email::new().reply_to("name1@domain.tld");
    assert_eq!(
        payload(&email, &settings)["headers"],
        json!({"Reply-To": "name1@domain.tld"})
    );
    assert_eq!(
        payload(&Email::new(), &settings)["headers"],
        json!({"Reply-To": "bart@simpsons.com"})
    );
    assert_eq!(payload(&Email::new(), &Settings::default())["headers"], json!({}));
}

#[test]
fn reply_to_display_name_with_comma_is_quoted() {
    let email = Email::new().reply_to(("Doe, John", "john@example.com"));
    let headers = payload(&email, &Settings::default())["headers"].clone();

    assert_eq!(headers, json!({"Reply-To": "\"Doe, John\" <john@example.com>"}));
    let reparsed = courier::Address::parse_list(headers["Reply-To"].as_str().unwrap());
    assert_eq!(reparsed, vec![courier::Address::with_name("Doe, John", "john@example.com")]);
}

#[test]
fn tags_from_message_and_settings() {
    let settings = Settings {
        tags: Some("configured".into()),
        ..Settings::default()
    };
    let email = Email::new().header("tags", "test_tag1, test_tag2");

    assert_eq!(
        payload(&email, &settings)["tags"],
        json!(["test_tag1", "test_tag2", "configured"])
    );
}

#[test]
fn inline_attachments_become_images() {
    let email = Email::new()
        .html_body("<img src=\"cid:logo\">")
        .attachment(
            Attachment::from_bytes("text.txt", b"This is a test".to_vec())
                .inline()
                .content_id("logo"),
        );
    let payload = payload(&email, &Settings::default());

    assert_eq!(
        payload["images"],
        json!([{"name": "logo", "type": "text/plain", "content": "VGhpcyBpcyBhIHRlc3Q=\n"}])
    );
    assert!(payload.get("attachments").is_none());
}

#[test]
fn single_part_mime_has_no_text() {
    let raw = b"From: John Doe <john@example.com>\r\n\
To: jane@example.com\r\n\
Subject: Plain\r\n\
Content-Type: text/plain\r\n\
\r\n\
Just text";
    let mime = MimeMessage::parse(raw).unwrap();
    let settings = Settings::default();
    let provider = MandrillProvider::new("1234", Arc::new(courier::testing::RecordingTransport::new()));
    let message = provider.mandrill_message(&Message::new(&mime, &settings));

    assert_eq!(message.text, None);
    assert_eq!(message.html.as_deref(), Some("Just text"));
    assert_eq!(message.from_name.as_deref(), Some("John Doe"));
    assert_eq!(message.subject.as_deref(), Some("Plain"));
}
