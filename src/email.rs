//! Email struct with builder pattern.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::address::Address;
use crate::attachment::Attachment;
use crate::source::{AddressField, MailSource};

/// An email message composed in code.
///
/// Use the builder pattern to construct emails:
///
/// ```
/// use courier::Email;
///
/// let email = Email::new()
///     .from("Sender <sender@example.com>")
///     .to("recipient@example.com")
///     .subject("Hello!")
///     .text_body("Plain text content")
///     .html_body("<h1>HTML content</h1>")
///     .option("track_opens", true)
///     .option("tags", "welcome, onboarding");
/// ```
///
/// ## Fields
///
/// - `from`, `to`, `cc`, `bcc` - Addresses
/// - `reply_to` - Reply-to addresses
/// - `subject`, `text_body`, `html_body` - Content
/// - `attachments` - File attachments
/// - `headers` - Custom email headers
/// - `options` - Per-message delivery options (tracking, tags, domains, ...)
///
/// Per-message options take precedence over configured settings when a
/// provider payload is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Email {
    /// Sender address
    pub from: Option<Address>,
    /// Primary recipients
    pub to: Vec<Address>,
    /// Carbon copy recipients
    pub cc: Vec<Address>,
    /// Blind carbon copy recipients
    pub bcc: Vec<Address>,
    /// Reply-to addresses
    pub reply_to: Vec<Address>,
    /// Email subject line
    pub subject: String,
    /// Plain text body
    pub text_body: Option<String>,
    /// HTML body
    pub html_body: Option<String>,
    /// File attachments
    pub attachments: Vec<Attachment>,
    /// Custom email headers
    pub headers: HashMap<String, String>,
    /// Per-message delivery options, keyed like the settings they override
    pub options: BTreeMap<String, Value>,
}

impl Email {
    /// Create a new empty email.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender address.
    pub fn from(mut self, addr: impl Into<Address>) -> Self {
        self.from = Some(addr.into());
        self
    }

    /// Add a recipient.
    pub fn to(mut self, addr: impl Into<Address>) -> Self {
        self.to.push(addr.into());
        self
    }

    /// Add a CC recipient.
    pub fn cc(mut self, addr: impl Into<Address>) -> Self {
        self.cc.push(addr.into());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(mut self, addr: impl Into<Address>) -> Self {
        self.bcc.push(addr.into());
        self
    }

    /// Add a reply-to address.
    pub fn reply_to(mut self, addr: impl Into<Address>) -> Self {
        self.reply_to.push(addr.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the plain text body.
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Set the HTML body.
    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Add an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a per-message delivery option.
    ///
    /// Keys are the setting names (`inline_css`, `track_clicks`, `tags`,
    /// `subaccount`, ...). Arrays are joined with `", "`.
    ///
    /// ```rust
    /// use courier::Email;
    ///
    /// let email = Email::new()
    ///     .option("inline_css", false)
    ///     .option("tags", vec!["signup", "welcome"]);
    /// ```
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn option_value(&self, name: &str) -> Option<String> {
        self.options
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value_to_header(value))
    }
}

fn value_to_header(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_header)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn join_formatted(addresses: &[Address]) -> Option<String> {
    if addresses.is_empty() {
        None
    } else {
        Some(
            addresses
                .iter()
                .map(Address::formatted)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

impl MailSource for Email {
    fn header(&self, name: &str) -> Option<String> {
        let field = [
            AddressField::From,
            AddressField::To,
            AddressField::Cc,
            AddressField::Bcc,
            AddressField::ReplyTo,
        ]
        .into_iter()
        .find(|field| field.header_name().eq_ignore_ascii_case(name));

        if let Some(field) = field {
            return join_formatted(&self.addresses(field));
        }
        if name.eq_ignore_ascii_case("Subject") {
            return MailSource::subject(self);
        }

        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
            .or_else(|| self.option_value(name))
    }

    fn addresses(&self, field: AddressField) -> Vec<Address> {
        match field {
            AddressField::From => self.from.iter().cloned().collect(),
            AddressField::To => self.to.clone(),
            AddressField::Cc => self.cc.clone(),
            AddressField::Bcc => self.bcc.clone(),
            AddressField::ReplyTo => self.reply_to.clone(),
        }
    }

    fn subject(&self) -> Option<String> {
        if self.subject.is_empty() {
            None
        } else {
            Some(self.subject.clone())
        }
    }

    fn is_multipart(&self) -> bool {
        (self.text_body.is_some() && self.html_body.is_some()) || !self.attachments.is_empty()
    }

    fn text_part(&self) -> Option<String> {
        self.text_body.clone()
    }

    fn html_part(&self) -> Option<String> {
        self.html_body.clone()
    }

    fn body(&self) -> Option<String> {
        self.html_body.clone().or_else(|| self.text_body.clone())
    }

    fn attachments(&self) -> Vec<Attachment> {
        self.attachments.clone()
    }
}
