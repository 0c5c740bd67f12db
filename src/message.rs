//! Provider-agnostic view of a message, combined with resolved settings.
//!
//! Every provider option can be set on the message itself (as a header or
//! [`Email::option`](crate::Email::option)) or in [`Settings`]; the
//! message wins. Boolean options resolve to one of three states:
//!
//! | Resolved value | Payload |
//! |----------------|---------|
//! | `None` | key omitted |
//! | `Some(false)` | key sent as `false` |
//! | `Some(true)` | key sent as `true` |

use serde::Serialize;

use crate::address::Address;
use crate::attachment::Attachment;
use crate::settings::{OptionKey, Settings};
use crate::source::{AddressField, MailSource};

/// Which attachments an enumeration should yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentFilter {
    /// Inline and regular attachments.
    #[default]
    Any,
    /// Inline attachments only.
    Inline,
    /// Regular (non-inline) attachments only.
    Regular,
}

impl AttachmentFilter {
    fn accepts(&self, attachment: &Attachment) -> bool {
        match self {
            Self::Any => true,
            Self::Inline => attachment.is_inline(),
            Self::Regular => !attachment.is_inline(),
        }
    }
}

/// An attachment ready to be embedded in a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedAttachment {
    /// Content-id for inline attachments, filename otherwise
    pub name: String,
    pub mime_type: String,
    /// Line-wrapped base64 of the decoded bytes
    pub content: String,
    pub inline: bool,
}

/// Read-only canonical view over a [`MailSource`] and its [`Settings`].
pub struct Message<'a> {
    source: &'a dyn MailSource,
    settings: &'a Settings,
    attachments: Vec<Attachment>,
}

impl<'a> Message<'a> {
    /// Build the view. Attachments are enumerated once, up front.
    pub fn new(source: &'a dyn MailSource, settings: &'a Settings) -> Self {
        Self {
            source,
            settings,
            attachments: source.attachments(),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Sender from the `From` header, else from the `from` setting.
    pub fn from_address(&self) -> Option<Address> {
        self.source
            .addresses(AddressField::From)
            .into_iter()
            .next()
            .or_else(|| self.settings.from.as_deref().map(Address::parse_mailbox))
    }

    pub fn from_email(&self) -> Option<String> {
        self.from_address().map(|a| a.email)
    }

    pub fn from_name(&self) -> Option<String> {
        self.from_address().and_then(|a| a.name)
    }

    /// Addresses of one recipient field, in header order.
    pub fn recipients(&self, field: AddressField) -> Vec<Address> {
        self.source.addresses(field)
    }

    pub fn subject(&self) -> Option<String> {
        self.source.subject()
    }

    /// The plain-text alternative.
    ///
    /// Only multipart messages have one; a single-part message yields
    /// `None` whatever its content type.
    pub fn text_body(&self) -> Option<String> {
        if self.source.is_multipart() {
            self.source.text_part()
        } else {
            None
        }
    }

    /// The HTML part, falling back to the primary body.
    pub fn html_body(&self) -> Option<String> {
        self.source.html_part().or_else(|| self.source.body())
    }

    /// `Reply-To` header, else the `reply_to` setting.
    pub fn reply_to(&self) -> Option<String> {
        self.source
            .header(AddressField::ReplyTo.header_name())
            .or_else(|| self.settings.reply_to.clone())
    }

    /// Message tags followed by configured tags.
    pub fn tags(&self) -> Vec<String> {
        let own = self.source.header(OptionKey::Tags.as_str());
        let configured = self.settings.tags.clone();
        [own, configured]
            .into_iter()
            .flatten()
            .flat_map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Source attachments matching the filter, in message order.
    pub fn raw_attachments(
        &self,
        filter: AttachmentFilter,
    ) -> impl Iterator<Item = &Attachment> + '_ {
        self.attachments.iter().filter(move |a| filter.accepts(a))
    }

    /// Attachments matching the filter, base64-encoded.
    ///
    /// Each call starts a fresh enumeration.
    pub fn attachments(
        &self,
        filter: AttachmentFilter,
    ) -> impl Iterator<Item = EncodedAttachment> + '_ {
        self.raw_attachments(filter).map(|a| EncodedAttachment {
            name: a.reference_name().to_string(),
            mime_type: a.content_type.clone(),
            content: a.base64_data(),
            inline: a.is_inline(),
        })
    }

    pub fn has_attachments(&self, filter: AttachmentFilter) -> bool {
        self.raw_attachments(filter).next().is_some()
    }

    /// Message header named after the key, else the configured value.
    pub fn fallback_value(&self, key: OptionKey) -> Option<String> {
        self.source
            .header(key.as_str())
            .or_else(|| self.settings.get(key).map(|value| value.to_string()))
    }

    /// Tri-state resolution: `None` when unset anywhere, `Some(true)` for
    /// `true`, `Some(false)` for any other present value.
    pub fn tri_state(&self, key: OptionKey) -> Option<bool> {
        self.fallback_value(key)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// String resolution of an option.
    pub fn string_value(&self, key: OptionKey) -> Option<String> {
        self.fallback_value(key)
    }
}
