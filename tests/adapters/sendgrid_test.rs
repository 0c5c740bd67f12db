//! SendGrid adapter tests.

use courier::providers::SendGridProvider;
use courier::testing::RecordingTransport;
use courier::{Attachment, Email, HttpTransport, Message, MimeMessage, Payload, Provider, Settings};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn valid_email() -> Email {
    Email::new()
        .from(("T Stark", "tony.stark@example.com"))
        .to(("Steve Rogers", "steve.rogers@example.com"))
        .subject("Hello, Avengers!")
        .html_body("<h1>Hello</h1>")
        .text_body("Hello")
}

fn build(email: &Email, settings: &Settings) -> Payload {
    let provider = SendGridProvider::new("SG.1234", Arc::new(RecordingTransport::new()));
    provider.build_payload(&Message::new(email, settings)).unwrap()
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn posts_multipart_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/mail.send.json"))
        .and(header("Authorization", "Bearer SG.1234"))
        .and(header_regex("Content-Type", "^multipart/form-data"))
        .and(body_string_contains("name=\"to[]\""))
        .and(body_string_contains("steve.rogers@example.com"))
        .and(body_string_contains("name=\"fromname\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings::default();
    let provider = SendGridProvider::new("SG.1234", Arc::new(HttpTransport::new())).base_url(server.uri());
    let email = valid_email();
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    let response = provider.send(payload).await.unwrap();
    assert_eq!(response, json!({"message": "success"}));
}

#[tokio::test]
async fn uploads_attachment_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/mail.send.json"))
        .and(body_string_contains("name=\"files[text.txt]\"; filename=\"text.txt\""))
        .and(body_string_contains("This is a test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings::default();
    let provider = SendGridProvider::new("SG.1234", Arc::new(HttpTransport::new())).base_url(server.uri());
    let email = valid_email().attachment(Attachment::from_bytes("text.txt", b"This is a test".to_vec()));
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    provider.send(payload).await.unwrap();
}

#[tokio::test]
async fn v2_error_uses_error_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/mail.send.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "error",
            "errors": ["Bad username / password"]
        })))
        .mount(&server)
        .await;

    let settings = Settings::default();
    let provider = SendGridProvider::new("SG.bad", Arc::new(HttpTransport::new())).base_url(server.uri());
    let email = valid_email();
    let payload = provider.build_payload(&Message::new(&email, &settings)).unwrap();

    let err = provider.send(payload).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Bad username / password"));
}

// ============================================================================
// Payload Tests
// ============================================================================

#[test]
fn maps_scalar_fields() {
    let payload = build(&valid_email().reply_to("hulk.smash@example.com"), &Settings::default());

    assert_eq!(payload.text_values("from"), vec!["tony.stark@example.com"]);
    assert_eq!(payload.text_values("fromname"), vec!["T Stark"]);
    assert_eq!(payload.text_values("subject"), vec!["Hello, Avengers!"]);
    assert_eq!(payload.text_values("html"), vec!["<h1>Hello</h1>"]);
    assert_eq!(payload.text_values("text"), vec!["Hello"]);
    assert_eq!(payload.text_values("replyto"), vec!["hulk.smash@example.com"]);
    assert_eq!(payload.text_values("toname[]"), vec!["Steve Rogers"]);
}

#[test]
fn omits_absent_fields() {
    let payload = build(&Email::new().to("a@example.com").html_body("<p>Hi</p>"), &Settings::default());

    assert!(payload.text_values("from").is_empty());
    assert!(payload.text_values("fromname").is_empty());
    assert!(payload.text_values("text").is_empty());
    assert!(payload.text_values("replyto").is_empty());
    assert!(payload.text_values("x-smtpapi").is_empty());
    assert!(payload.text_values("bcc[]").is_empty());
}

#[test]
fn bcc_joins_header_and_configured_address() {
    let settings = Settings {
        bcc_address: Some("audit@example.com".into()),
        ..Settings::default()
    };
    let payload = build(&valid_email().bcc("thor.odinson@example.com"), &settings);
    assert_eq!(
        payload.text_values("bcc[]"),
        vec!["thor.odinson@example.com", "audit@example.com"]
    );
}

#[test]
fn attachments_are_uploads_with_content_type() {
    let email = valid_email()
        .attachment(Attachment::from_bytes("report.pdf", b"%PDF".to_vec()))
        .attachment(Attachment::from_bytes("logo.png", vec![0x89, 0x50]).inline().content_id("<logo@example>"));
    let payload = build(&email, &Settings::default());

    let report = payload.file("files[report.pdf]").unwrap();
    assert_eq!(report.content_type, "application/pdf");
    assert_eq!(report.data, b"%PDF");
    assert!(payload.text_values("content[report.pdf]").is_empty());

    let logo = payload.file("files[logo.png]").unwrap();
    assert_eq!(logo.content_type, "image/png");
    assert_eq!(payload.text_values("content[logo.png]"), vec!["logo@example"]);
}

#[test]
fn unnamed_mime_attachments_are_all_uploaded() {
    let raw = b"From: a@example.com\r\n\
To: b@example.com\r\n\
Subject: Scans\r\n\
Content-Type: multipart/mixed; boundary=\"b\"\r\n\
\r\n\
--b\r\n\
Content-Type: text/plain\r\n\
\r\n\
Two scans attached.\r\n\
--b\r\n\
Content-Type: application/octet-stream\r\n\
Content-Disposition: attachment\r\n\
\r\n\
first\r\n\
--b\r\n\
Content-Type: application/octet-stream\r\n\
Content-Disposition: attachment\r\n\
\r\n\
second\r\n\
--b--\r\n";
    let mime = MimeMessage::parse(raw).unwrap();
    let settings = Settings::default();
    let provider = SendGridProvider::new("SG.1234", Arc::new(RecordingTransport::new()));
    let payload = provider.build_payload(&Message::new(&mime, &settings)).unwrap();

    assert!(payload.file("files[attachment]").unwrap().data.starts_with(b"first"));
    assert!(payload.file("files[attachment-1]").unwrap().data.starts_with(b"second"));
}
