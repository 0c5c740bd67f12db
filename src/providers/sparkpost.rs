//! SparkPost API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier::providers::SparkPostProvider;
//! use courier::HttpTransport;
//! use std::sync::Arc;
//!
//! let provider = SparkPostProvider::new("sp-xxxxx", Arc::new(HttpTransport::new()));
//! ```
//!
//! Recipients are the `To` and `Cc` addresses, in that order, without a
//! type tag. Tracking options are tri-state and live under `options`;
//! `return_path_domain` becomes the top-level `return_path`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::address::Address;
use crate::error::MailError;
use crate::message::{AttachmentFilter, EncodedAttachment, Message};
use crate::payload::Payload;
use crate::provider::Provider;
use crate::settings::{OptionKey, Settings};
use crate::source::AddressField;
use crate::transport::{ApiRequest, Transport};

const SPARKPOST_API_URL: &str = "https://api.sparkpost.com/api/v1";

/// SparkPost API email provider.
pub struct SparkPostProvider {
    api_key: String,
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl SparkPostProvider {
    /// Create a new SparkPost provider with the given API key.
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.into(),
            transport,
            base_url: SPARKPOST_API_URL.to_string(),
        }
    }

    /// Build from resolved settings. Fails without a non-blank API key.
    pub fn from_settings(settings: &Settings, transport: Arc<dyn Transport>) -> Result<Self, MailError> {
        let api_key = settings.require_api_key("sparkpost")?;
        Ok(Self::new(api_key, transport))
    }

    /// Set a custom base URL (for testing, or the EU endpoint).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The body of a `transmissions` call.
    pub fn sparkpost_message(&self, message: &Message<'_>) -> SparkPostTransmission {
        let recipients = [AddressField::To, AddressField::Cc]
            .into_iter()
            .flat_map(|field| message.recipients(field))
            .map(|address| SparkPostRecipient {
                address: address.into(),
            })
            .collect();

        SparkPostTransmission {
            options: SparkPostOptions {
                inline_css: message.tri_state(OptionKey::InlineCss),
                click_tracking: message.tri_state(OptionKey::TrackClicks),
                open_tracking: message.tri_state(OptionKey::TrackOpens),
            },
            return_path: message.string_value(OptionKey::ReturnPathDomain),
            content: SparkPostContent {
                from: SparkPostSender {
                    email: message.from_email(),
                    name: message.from_name(),
                },
                subject: message.subject(),
                reply_to: message.reply_to(),
                html: message.html_body(),
                text: message.text_body(),
                attachments: message
                    .attachments(AttachmentFilter::Regular)
                    .map(SparkPostAttachment::from)
                    .collect(),
                inline_images: message
                    .attachments(AttachmentFilter::Inline)
                    .map(SparkPostAttachment::from)
                    .collect(),
            },
            recipients,
        }
    }
}

#[async_trait]
impl Provider for SparkPostProvider {
    fn provider_name(&self) -> &'static str {
        "sparkpost"
    }

    fn build_payload(&self, message: &Message<'_>) -> Result<Payload, MailError> {
        Ok(Payload::Json(serde_json::to_value(self.sparkpost_message(message))?))
    }

    async fn send(&self, payload: Payload) -> Result<Value, MailError> {
        let url = format!("{}/transmissions", self.base_url);
        let request = ApiRequest::new("sparkpost", url, payload).header("Authorization", &self.api_key);
        self.transport.send(request).await
    }
}

// ============================================================================
// SparkPost API Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SparkPostTransmission {
    /// Always present, possibly empty
    pub options: SparkPostOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,
    pub content: SparkPostContent,
    pub recipients: Vec<SparkPostRecipient>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SparkPostOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_tracking: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SparkPostContent {
    pub from: SparkPostSender,
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SparkPostAttachment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inline_images: Vec<SparkPostAttachment>,
}

/// Sender; `email` is `null` when neither the message nor the settings
/// name one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SparkPostSender {
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SparkPostAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<Address> for SparkPostAddress {
    fn from(address: Address) -> Self {
        Self {
            email: address.email,
            name: address.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SparkPostRecipient {
    pub address: SparkPostAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SparkPostAttachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Line-wrapped base64
    pub data: String,
}

impl From<EncodedAttachment> for SparkPostAttachment {
    fn from(a: EncodedAttachment) -> Self {
        Self {
            name: a.name,
            mime_type: a.mime_type,
            data: a.content,
        }
    }
}
