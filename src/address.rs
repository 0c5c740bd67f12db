//! Email address type with optional display name.

use email_address::EmailAddress;
use mailparse::MailAddr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address with an optional display name.
///
/// # Examples
///
/// ```
/// use courier::Address;
///
/// let addr = Address::parse_mailbox("John Doe <john@example.com>");
/// assert_eq!(addr.email, "john@example.com");
/// assert_eq!(addr.name.as_deref(), Some("John Doe"));
///
/// let addr: Address = "user@example.com".into();
/// assert_eq!(addr.name, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Optional display name (e.g., "Alice Smith")
    pub name: Option<String>,
    /// Email address (e.g., "alice@example.com")
    pub email: String,
}

impl Address {
    /// Create a new address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create a new address with a name and email.
    ///
    /// An empty name is treated as no name.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() { None } else { Some(name) },
            email: email.into(),
        }
    }

    /// Parse a single mailbox such as `John Doe <john@example.com>`.
    ///
    /// Only the first mailbox of the input is kept. Input that cannot be
    /// parsed as a mailbox is kept verbatim (trimmed) as the email.
    pub fn parse_mailbox(input: &str) -> Self {
        Self::parse_list(input)
            .into_iter()
            .next()
            .unwrap_or_else(|| Self::new(input.trim()))
    }

    /// Parse an address-list header value into its mailboxes.
    ///
    /// Groups are flattened into their members, in order.
    pub fn parse_list(input: &str) -> Vec<Self> {
        if input.trim().is_empty() {
            return Vec::new();
        }

        let parsed = match mailparse::addrparse(input) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(input = %input, error = %e, "Unparsable address list, keeping raw value");
                return vec![Self::new(input.trim())];
            }
        };

        let mut addresses = Vec::new();
        for addr in parsed.iter() {
            match addr {
                MailAddr::Single(single) => addresses.push(Self::from_parts(
                    single.display_name.as_deref(),
                    &single.addr,
                )),
                MailAddr::Group(group) => addresses.extend(
                    group
                        .addrs
                        .iter()
                        .map(|single| Self::from_parts(single.display_name.as_deref(), &single.addr)),
                ),
            }
        }
        addresses
    }

    fn from_parts(name: Option<&str>, email: &str) -> Self {
        if !EmailAddress::is_valid(email) {
            tracing::warn!(email = %email, "Forwarding address that does not validate as RFC 5322");
        }
        Self {
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
            email: email.to_string(),
        }
    }

    /// Check the address with RFC 5321/5322 validation.
    pub fn is_valid(&self) -> bool {
        EmailAddress::is_valid(&self.email)
    }

    /// Format as "Name <email>" or just "email" if no name.
    ///
    /// Names containing RFC 5322 specials are written as a quoted-string,
    /// with `\` and `"` escaped.
    pub fn formatted(&self) -> String {
        match &self.name {
            Some(name) if name.contains(RFC5322_SPECIALS) => {
                // Escape backslashes first, then quotes
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\" <{}>", escaped, self.email)
            }
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

const RFC5322_SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

// From &str - parsed as a mailbox
impl From<&str> for Address {
    fn from(input: &str) -> Self {
        Self::parse_mailbox(input)
    }
}

impl From<String> for Address {
    fn from(input: String) -> Self {
        Self::parse_mailbox(&input)
    }
}

// From tuple (name, email)
impl From<(&str, &str)> for Address {
    fn from((name, email): (&str, &str)) -> Self {
        Self::with_name(name, email)
    }
}

impl From<(String, String)> for Address {
    fn from((name, email): (String, String)) -> Self {
        Self::with_name(name, email)
    }
}
