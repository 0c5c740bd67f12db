//! The parsed-message capability consumed by the message builders.
//!
//! Anything that can answer these questions about an email can be
//! delivered: the [`Email`](crate::Email) builder and raw MIME input via
//! [`MimeMessage`](crate::MimeMessage) both implement [`MailSource`].

use crate::address::Address;
use crate::attachment::Attachment;

/// Address-bearing header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    From,
    To,
    Cc,
    Bcc,
    ReplyTo,
}

impl AddressField {
    /// Header name as it appears in a message.
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::From => "From",
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
            Self::ReplyTo => "Reply-To",
        }
    }

    /// Lowercase recipient type tag (`to`, `cc`, `bcc`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
            Self::ReplyTo => "reply-to",
        }
    }
}

/// Read-only access to an already composed or parsed message.
pub trait MailSource: Send + Sync {
    /// Header value by name, case-insensitive. `None` when absent.
    fn header(&self, name: &str) -> Option<String>;

    /// Addresses carried by an address header, in header order.
    fn addresses(&self, field: AddressField) -> Vec<Address>;

    /// Subject line.
    fn subject(&self) -> Option<String>;

    /// Whether the message is a multipart message.
    fn is_multipart(&self) -> bool;

    /// Decoded `text/plain` alternative part, if the message has one.
    fn text_part(&self) -> Option<String>;

    /// Decoded `text/html` part, if the message has one.
    fn html_part(&self) -> Option<String>;

    /// Decoded primary body, used when there is no HTML part.
    fn body(&self) -> Option<String>;

    /// Attachments in message order, with decoded bytes.
    fn attachments(&self) -> Vec<Attachment>;
}

impl<T: MailSource + ?Sized> MailSource for &T {
    fn header(&self, name: &str) -> Option<String> {
        (**self).header(name)
    }

    fn addresses(&self, field: AddressField) -> Vec<Address> {
        (**self).addresses(field)
    }

    fn subject(&self) -> Option<String> {
        (**self).subject()
    }

    fn is_multipart(&self) -> bool {
        (**self).is_multipart()
    }

    fn text_part(&self) -> Option<String> {
        (**self).text_part()
    }

    fn html_part(&self) -> Option<String> {
        (**self).html_part()
    }

    fn body(&self) -> Option<String> {
        (**self).body()
    }

    fn attachments(&self) -> Vec<Attachment> {
        (**self).attachments()
    }
}
