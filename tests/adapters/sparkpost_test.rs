//! SparkPost adapter tests.

use courier::providers::SparkPostProvider;
use courier::testing::RecordingTransport;
use courier::{Attachment, Email, HttpTransport, Message, Provider, Settings};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn options() -> Settings {
    Settings {
        api_key: Some("1234".into()),
        ..Settings::default()
    }
}

fn sparkpost_message(email: &Email, settings: &Settings) -> Value {
    let provider = SparkPostProvider::new("1234", Arc::new(RecordingTransport::new()));
    let message = Message::new(email, settings);
    serde_json::to_value(provider.sparkpost_message(&message)).unwrap()
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn sends_transmission_with_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transmissions"))
        .and(header("Authorization", "1234"))
        .and(body_json(json!({
            "options": {},
            "content": {
                "from": {"email": "from_name@domain.tld", "name": "John Doe"},
                "subject": "Hello",
                "html": "<p>Hi</p>"
            },
            "recipients": [{"address": {"email": "name@domain.tld"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {"total_rejected_recipients": 0, "total_accepted_recipients": 1, "id": "11668787484950529"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = options();
    let provider = SparkPostProvider::from_settings(&settings, Arc::new(HttpTransport::new()))
        .unwrap()
        .base_url(server.uri());
    let email = Email::new()
        .from("John Doe <from_name@domain.tld>")
        .to("name@domain.tld")
        .subject("Hello")
        .html_body("<p>Hi</p>");
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    let response = provider.send(payload).await.unwrap();
    assert_eq!(response["results"]["id"], "11668787484950529");
}

#[tokio::test]
async fn error_list_is_joined() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transmissions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{"message": "Unauthorized."}]
        })))
        .mount(&server)
        .await;

    let settings = options();
    let provider = SparkPostProvider::from_settings(&settings, Arc::new(HttpTransport::new()))
        .unwrap()
        .base_url(server.uri());
    let email = Email::new().to("name@domain.tld");
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    let err = provider.send(payload).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Unauthorized."));
}

// ============================================================================
// Payload Tests
// ============================================================================

#[test]
fn takes_an_attachment() {
    let email = Email::new()
        .to("name@domain.tld")
        .attachment(Attachment::from_bytes("text.txt", b"This is a test".to_vec()).content_type("text/plain"));

    let message = sparkpost_message(&email, &options());
    assert_eq!(
        message["content"]["attachments"],
        json!([{"name": "text.txt", "type": "text/plain", "data": "VGhpcyBpcyBhIHRlc3Q=\n"}])
    );
    assert!(message["content"].get("inline_images").is_none());
}

#[test]
fn ignores_inline_attachments_in_attachments() {
    let email = Email::new()
        .to("name@domain.tld")
        .attachment(Attachment::from_bytes("text.txt", b"This is a test".to_vec()).inline());

    let message = sparkpost_message(&email, &options());
    assert!(message["content"].get("attachments").is_none());
    assert_eq!(
        message["content"]["inline_images"],
        json!([{"name": "text.txt", "type": "text/plain", "data": "VGhpcyBpcyBhIHRlc3Q=\n"}])
    );
}

#[test]
fn from_falls_back_to_settings() {
    let settings = Settings {
        from: Some("John Doe <bart@simpsons.com>".into()),
        ..options()
    };
    let message = sparkpost_message(&Email::new(), &settings);
    assert_eq!(
        message["content"]["from"],
        json!({"email": "bart@simpsons.com", "name": "John Doe"})
    );
}

#[test]
fn from_without_display_name_has_no_name_key() {
    let email = Email::new().from("from_name@domain.tld");
    let message = sparkpost_message(&email, &options());
    assert_eq!(message["content"]["from"], json!({"email": "from_name@domain.tld"}));
}

#[test]
fn reply_to_from_header_or_settings() {
    let email = Email::new().reply_to("name1@domain.tld");
    assert_eq!(
        sparkpost_message(&email, &options())["content"]["reply_to"],
        json!("name1@domain.tld")
    );

    let settings = Settings {
        reply_to: Some("bart@simpsons.com".into()),
        ..options()
    };
    assert_eq!(
        sparkpost_message(&Email::new(), &settings)["content"]["reply_to"],
        json!("bart@simpsons.com")
    );
}

#[test]
fn tracking_options_are_tri_state() {
    let settings = Settings {
        track_opens: Some(true),
        ..options()
    };
    let email = Email::new().option("inline_css", false);

    let message = sparkpost_message(&email, &settings);
    assert_eq!(message["options"], json!({"inline_css": false, "open_tracking": true}));
}

#[test]
fn return_path_from_return_path_domain() {
    let email = Email::new().option("return_path_domain", "bounces.example.com");
    let message = sparkpost_message(&email, &options());
    assert_eq!(message["return_path"], json!("bounces.example.com"));
}

#[test]
fn text_only_for_multipart() {
    let single = Email::new().text_body("Hello");
    let message = sparkpost_message(&single, &options());
    assert!(message["content"].get("text").is_none());
    assert_eq!(message["content"]["html"], json!("Hello"));

    let multipart = Email::new().text_body("Hello").html_body("<p>Hello</p>");
    let message = sparkpost_message(&multipart, &options());
    assert_eq!(message["content"]["text"], json!("Hello"));
    assert_eq!(message["content"]["html"], json!("<p>Hello</p>"));
}
