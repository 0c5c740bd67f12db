//! SendGrid API provider.
//!
//! Uses the form-encoded `mail.send` endpoint, which takes attachments as
//! file uploads rather than inline base64.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier::providers::SendGridProvider;
//! use courier::HttpTransport;
//! use std::sync::Arc;
//!
//! let provider = SendGridProvider::new("SG.xxxxx", Arc::new(HttpTransport::new()));
//! ```
//!
//! ## Form fields
//!
//! | Field | Source |
//! |-------|--------|
//! | `to[]`, `toname[]` | `To` addresses |
//! | `cc[]`, `ccname[]` | `Cc` addresses |
//! | `bcc[]` | `Bcc` addresses, then `bcc_address` |
//! | `from`, `fromname` | sender |
//! | `subject`, `html`, `text` | content |
//! | `replyto` | `Reply-To`, else `reply_to` |
//! | `files[<name>]` | every attachment, as an upload |
//! | `content[<name>]` | content-id of inline attachments |
//! | `x-smtpapi` | `{"category": tags}` when tagged |

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::address::Address;
use crate::attachment::Attachment;
use crate::error::MailError;
use crate::message::{AttachmentFilter, Message};
use crate::payload::{FormPart, Payload, UploadIo};
use crate::provider::Provider;
use crate::settings::{OptionKey, Settings};
use crate::source::AddressField;
use crate::transport::{ApiRequest, Transport};

const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

/// SendGrid API email provider.
pub struct SendGridProvider {
    api_key: String,
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl SendGridProvider {
    /// Create a new SendGrid provider with the given API key.
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.into(),
            transport,
            base_url: SENDGRID_API_URL.to_string(),
        }
    }

    /// Build from resolved settings. Fails without a non-blank API key.
    pub fn from_settings(settings: &Settings, transport: Arc<dyn Transport>) -> Result<Self, MailError> {
        let api_key = settings.require_api_key("sendgrid")?;
        Ok(Self::new(api_key, transport))
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The mail object for a `mail.send` call.
    pub fn sendgrid_message(&self, message: &Message<'_>) -> SendGridMessage {
        let mut bcc: Vec<String> = message
            .recipients(AddressField::Bcc)
            .into_iter()
            .map(|a| a.email)
            .collect();
        bcc.extend(message.string_value(OptionKey::BccAddress));

        SendGridMessage {
            to: message.recipients(AddressField::To),
            cc: message.recipients(AddressField::Cc),
            bcc,
            from: message.from_email(),
            from_name: message.from_name(),
            subject: message.subject(),
            html: message.html_body(),
            text: message.text_body(),
            reply_to: message.reply_to(),
            tags: message.tags(),
            attachments: message
                .raw_attachments(AttachmentFilter::Regular)
                .map(SendGridUpload::from)
                .collect(),
            contents: message
                .raw_attachments(AttachmentFilter::Inline)
                .map(SendGridUpload::from)
                .collect(),
        }
    }
}

#[async_trait]
impl Provider for SendGridProvider {
    fn provider_name(&self) -> &'static str {
        "sendgrid"
    }

    fn build_payload(&self, message: &Message<'_>) -> Result<Payload, MailError> {
        Ok(Payload::Form(self.sendgrid_message(message).into_form()?))
    }

    async fn send(&self, payload: Payload) -> Result<Value, MailError> {
        let url = format!("{}/api/mail.send.json", self.base_url);
        let request = ApiRequest::new("sendgrid", url, payload)
            .header("Authorization", format!("Bearer {}", self.api_key));
        self.transport.send(request).await
    }
}

// ============================================================================
// SendGrid API Types
// ============================================================================

/// A SendGrid mail, before form encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendGridMessage {
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    /// Always present, possibly empty
    pub bcc: Vec<String>,
    pub from: Option<String>,
    pub from_name: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub reply_to: Option<String>,
    pub tags: Vec<String>,
    /// Regular attachments
    pub attachments: Vec<SendGridUpload>,
    /// Inline attachments, referenced from the HTML by content-id
    pub contents: Vec<SendGridUpload>,
}

/// An attachment wrapped as a content-type-tagged upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendGridUpload {
    pub name: String,
    pub file: UploadIo,
    pub cid: Option<String>,
}

impl From<&Attachment> for SendGridUpload {
    fn from(attachment: &Attachment) -> Self {
        Self {
            name: attachment.filename.clone(),
            file: UploadIo {
                content_type: attachment.content_type.clone(),
                filename: attachment.filename.clone(),
                data: attachment.data.clone(),
            },
            cid: if attachment.is_inline() {
                attachment.content_id.clone()
            } else {
                None
            },
        }
    }
}

impl SendGridMessage {
    /// Flatten into multipart form fields.
    pub fn into_form(self) -> Result<Vec<FormPart>, MailError> {
        let mut parts = Vec::new();

        push_addresses(&mut parts, "to", &self.to);
        push_addresses(&mut parts, "cc", &self.cc);
        parts.extend(self.bcc.into_iter().map(|email| FormPart::text("bcc[]", email)));

        let scalars = [
            ("from", self.from),
            ("fromname", self.from_name),
            ("subject", self.subject),
            ("html", self.html),
            ("text", self.text),
            ("replyto", self.reply_to),
        ];
        for (name, value) in scalars {
            if let Some(value) = value {
                parts.push(FormPart::text(name, value));
            }
        }

        // form keys must be unique or the API keeps only one of the files
        let mut used = HashSet::new();
        for mut upload in self.attachments.into_iter().chain(self.contents) {
            let name = unique_name(&upload.name, &mut used);
            upload.file.filename = name.clone();
            if let Some(cid) = upload.cid {
                parts.push(FormPart::text(format!("content[{}]", name), cid));
            }
            parts.push(FormPart::file(format!("files[{}]", name), upload.file));
        }

        if !self.tags.is_empty() {
            let smtpapi = serde_json::to_string(&json!({ "category": self.tags }))?;
            parts.push(FormPart::text("x-smtpapi", smtpapi));
        }

        Ok(parts)
    }
}

/// `name` if unused, else `stem-N.ext` with the smallest free `N`.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => format!("{}-{}.{}", stem, n, ext),
            None => format!("{}-{}", stem, n),
        })
        .find(|candidate| used.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_string())
}

/// `<field>[]` for each address; `<field>name[]` alongside when any address
/// carries a display name, so the two lists stay aligned.
fn push_addresses(parts: &mut Vec<FormPart>, field: &str, addresses: &[Address]) {
    let named = addresses.iter().any(|a| a.name.is_some());
    for address in addresses {
        parts.push(FormPart::text(format!("{}[]", field), address.email.clone()));
        if named {
            parts.push(FormPart::text(
                format!("{}name[]", field),
                address.name.clone().unwrap_or_default(),
            ));
        }
    }
}
