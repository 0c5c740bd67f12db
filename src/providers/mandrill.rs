//! Mandrill API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier::providers::MandrillProvider;
//! use courier::HttpTransport;
//! use std::sync::Arc;
//!
//! let provider = MandrillProvider::new("md-xxxxx", Arc::new(HttpTransport::new()));
//! ```
//!
//! ## Option mapping
//!
//! | Payload key | Option | Kind |
//! |-------------|--------|------|
//! | `auto_html` | `auto_html` | tri-state |
//! | `auto_text` | `auto_text` | tri-state |
//! | `important` | `important` | bool, `false` when unset |
//! | `inline_css` | `inline_css` | tri-state |
//! | `track_clicks` | `track_clicks` | tri-state |
//! | `track_opens` | `track_opens` | tri-state |
//! | `url_strip_qs` | `track_url_without_query_string` | tri-state |
//! | `view_content_link` | `log_content` | tri-state |
//! | `bcc_address` | `bcc_address` | string |
//! | `return_path_domain` | `return_path_domain` | string |
//! | `signing_domain` | `signing_domain` | string |
//! | `subaccount` | `subaccount` | string |
//! | `tracking_domain` | `tracking_domain` | string |

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::address::Address;
use crate::error::MailError;
use crate::message::{AttachmentFilter, EncodedAttachment, Message};
use crate::payload::Payload;
use crate::provider::Provider;
use crate::settings::{OptionKey, Settings};
use crate::source::AddressField;
use crate::transport::{ApiRequest, Transport};

const MANDRILL_API_URL: &str = "https://mandrillapp.com/api/1.0";

/// Mandrill API email provider.
pub struct MandrillProvider {
    api_key: String,
    async_send: bool,
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl MandrillProvider {
    /// Create a new Mandrill provider with the given API key.
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.into(),
            async_send: false,
            transport,
            base_url: MANDRILL_API_URL.to_string(),
        }
    }

    /// Build from resolved settings. Fails without a non-blank API key.
    pub fn from_settings(settings: &Settings, transport: Arc<dyn Transport>) -> Result<Self, MailError> {
        let api_key = settings.require_api_key("mandrill")?;
        Ok(Self::new(api_key, transport).async_send(settings.async_send))
    }

    /// Ask Mandrill to queue the message instead of sending inline.
    pub fn async_send(mut self, enabled: bool) -> Self {
        self.async_send = enabled;
        self
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The `message` object of a `messages/send` call.
    pub fn mandrill_message(&self, message: &Message<'_>) -> MandrillMessage {
        let mut headers = BTreeMap::new();
        if let Some(reply_to) = message.reply_to() {
            headers.insert("Reply-To".to_string(), reply_to);
        }

        let to = [AddressField::To, AddressField::Cc, AddressField::Bcc]
            .into_iter()
            .flat_map(|field| {
                message
                    .recipients(field)
                    .into_iter()
                    .map(move |address| MandrillRecipient::new(address, field))
            })
            .collect();

        MandrillMessage {
            auto_html: message.tri_state(OptionKey::AutoHtml),
            auto_text: message.tri_state(OptionKey::AutoText),
            important: message.tri_state(OptionKey::Important).unwrap_or(false),
            inline_css: message.tri_state(OptionKey::InlineCss),
            track_clicks: message.tri_state(OptionKey::TrackClicks),
            track_opens: message.tri_state(OptionKey::TrackOpens),
            url_strip_qs: message.tri_state(OptionKey::TrackUrlWithoutQueryString),
            view_content_link: message.tri_state(OptionKey::LogContent),
            bcc_address: message.string_value(OptionKey::BccAddress),
            return_path_domain: message.string_value(OptionKey::ReturnPathDomain),
            signing_domain: message.string_value(OptionKey::SigningDomain),
            subaccount: message.string_value(OptionKey::Subaccount),
            tracking_domain: message.string_value(OptionKey::TrackingDomain),
            from_email: message.from_email(),
            from_name: message.from_name(),
            headers,
            html: message.html_body(),
            subject: message.subject(),
            tags: message.tags(),
            text: message.text_body(),
            to,
            attachments: message
                .attachments(AttachmentFilter::Regular)
                .map(MandrillAttachment::from)
                .collect(),
            images: message
                .attachments(AttachmentFilter::Inline)
                .map(MandrillAttachment::from)
                .collect(),
        }
    }
}

#[async_trait]
impl Provider for MandrillProvider {
    fn provider_name(&self) -> &'static str {
        "mandrill"
    }

    fn build_payload(&self, message: &Message<'_>) -> Result<Payload, MailError> {
        Ok(Payload::Json(serde_json::to_value(self.mandrill_message(message))?))
    }

    async fn send(&self, payload: Payload) -> Result<Value, MailError> {
        let message = payload
            .as_json()
            .cloned()
            .ok_or_else(|| MailError::provider("mandrill", "expected a JSON payload"))?;

        let body = json!({
            "key": self.api_key,
            "message": message,
            "async": self.async_send,
        });
        let url = format!("{}/messages/send.json", self.base_url);

        self.transport
            .send(ApiRequest::new("mandrill", url, Payload::Json(body)))
            .await
    }
}

// ============================================================================
// Mandrill API Types
// ============================================================================

/// Body of the `message` field.
///
/// Unset tri-state options and string options are left out entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MandrillMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_html: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_text: Option<bool>,
    pub important: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_strip_qs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_content_link: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_domain: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub html: Option<String>,
    pub subject: Option<String>,
    pub tags: Vec<String>,
    pub text: Option<String>,
    pub to: Vec<MandrillRecipient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MandrillAttachment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<MandrillAttachment>,
}

/// A recipient tagged with the header it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MandrillRecipient {
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl MandrillRecipient {
    fn new(address: Address, field: AddressField) -> Self {
        Self {
            email: address.email,
            name: address.name,
            kind: field.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MandrillAttachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Line-wrapped base64
    pub content: String,
}

impl From<EncodedAttachment> for MandrillAttachment {
    fn from(a: EncodedAttachment) -> Self {
        Self {
            name: a.name,
            mime_type: a.mime_type,
            content: a.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use crate::{Attachment, Email};

    fn provider() -> MandrillProvider {
        MandrillProvider::new("1234", Arc::new(RecordingTransport::new()))
    }

    #[test]
    fn test_from_settings_requires_api_key() {
        let transport: Arc<dyn Transport> = Arc::new(RecordingTransport::new());
        let result = MandrillProvider::from_settings(&Settings::default(), transport);
        assert!(matches!(result, Err(MailError::MissingCredential("mandrill"))));
    }

    #[test]
    fn test_from_settings_rejects_blank_api_key() {
        let settings = Settings {
            api_key: Some("  ".into()),
            ..Settings::default()
        };
        let result = MandrillProvider::from_settings(&settings, Arc::new(RecordingTransport::new()));
        assert!(matches!(result, Err(MailError::MissingCredential("mandrill"))));
    }

    #[test]
    fn test_recipients_in_to_cc_bcc_order() {
        let settings = Settings::default();
        let email = Email::new()
            .bcc("bcc@example.com")
            .cc("Cc Name <cc@example.com>")
            .to("to@example.com");
        let message = Message::new(&email, &settings);

        let to = provider().mandrill_message(&message).to;
        let kinds: Vec<_> = to.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec!["to", "cc", "bcc"]);
        assert_eq!(to[1].name.as_deref(), Some("Cc Name"));
        assert_eq!(to[0].name, None);
    }

    #[test]
    fn test_important_defaults_to_false() {
        let settings = Settings::default();
        let email = Email::new();
        let message = Message::new(&email, &settings);

        let payload = serde_json::to_value(provider().mandrill_message(&message)).unwrap();
        assert_eq!(payload["important"], json!(false));
        assert!(payload.get("inline_css").is_none());
        assert!(payload.get("subaccount").is_none());
    }

    #[test]
    fn test_attachments_split_by_disposition() {
        let settings = Settings::default();
        let email = Email::new()
            .text_body("Hi")
            .attachment(Attachment::from_bytes("text.txt", b"This is a test".to_vec()));
        let message = Message::new(&email, &settings);

        let payload = serde_json::to_value(provider().mandrill_message(&message)).unwrap();
        assert_eq!(
            payload["attachments"],
            json!([{"name": "text.txt", "type": "text/plain", "content": "VGhpcyBpcyBhIHRlc3Q=\n"}])
        );
        assert!(payload.get("images").is_none());
    }
}
