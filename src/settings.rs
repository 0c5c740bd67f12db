//! Delivery settings and their resolution.
//!
//! Settings are resolved from three layers, highest priority first:
//!
//! 1. Call-site [`Options`] passed when a delivery method is built
//! 2. Process-wide settings held by [`Courier`](crate::Courier)
//! 3. Built-in defaults ([`Settings::default`])
//!
//! Per-message options on the email itself take precedence over all of
//! them when a payload is built (see [`Message`](crate::Message)).
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `COURIER_PROVIDER` | `mandrill`, `sparkpost`, `sendgrid` |
//! | `COURIER_API_KEY` | API key for the selected provider |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::MailError;

/// Environment variable holding the default provider name.
pub const PROVIDER_ENV: &str = "COURIER_PROVIDER";
/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "COURIER_API_KEY";

/// A recognized configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    ProviderName,
    ApiKey,
    Async,
    AutoHtml,
    AutoText,
    Important,
    InlineCss,
    TrackClicks,
    TrackOpens,
    TrackUrlWithoutQueryString,
    LogContent,
    BccAddress,
    ReturnPathDomain,
    SigningDomain,
    Subaccount,
    TrackingDomain,
    Tags,
    From,
    ReplyTo,
    ReturnResponse,
}

impl OptionKey {
    /// Every recognized key, in a fixed order.
    pub const ALL: [OptionKey; 20] = [
        Self::ProviderName,
        Self::ApiKey,
        Self::Async,
        Self::AutoHtml,
        Self::AutoText,
        Self::Important,
        Self::InlineCss,
        Self::TrackClicks,
        Self::TrackOpens,
        Self::TrackUrlWithoutQueryString,
        Self::LogContent,
        Self::BccAddress,
        Self::ReturnPathDomain,
        Self::SigningDomain,
        Self::Subaccount,
        Self::TrackingDomain,
        Self::Tags,
        Self::From,
        Self::ReplyTo,
        Self::ReturnResponse,
    ];

    /// The snake_case key name, also used as the per-message header name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderName => "provider_name",
            Self::ApiKey => "api_key",
            Self::Async => "async",
            Self::AutoHtml => "auto_html",
            Self::AutoText => "auto_text",
            Self::Important => "important",
            Self::InlineCss => "inline_css",
            Self::TrackClicks => "track_clicks",
            Self::TrackOpens => "track_opens",
            Self::TrackUrlWithoutQueryString => "track_url_without_query_string",
            Self::LogContent => "log_content",
            Self::BccAddress => "bcc_address",
            Self::ReturnPathDomain => "return_path_domain",
            Self::SigningDomain => "signing_domain",
            Self::Subaccount => "subaccount",
            Self::TrackingDomain => "tracking_domain",
            Self::Tags => "tags",
            Self::From => "from",
            Self::ReplyTo => "reply_to",
            Self::ReturnResponse => "return_response",
        }
    }

    /// Whether the key holds a boolean.
    pub fn is_bool(&self) -> bool {
        matches!(
            self,
            Self::Async
                | Self::AutoHtml
                | Self::AutoText
                | Self::Important
                | Self::InlineCss
                | Self::TrackClicks
                | Self::TrackOpens
                | Self::TrackUrlWithoutQueryString
                | Self::LogContent
                | Self::ReturnResponse
        )
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| MailError::Configuration(format!("Unknown option key: {}", s)))
    }
}

/// A scalar configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    /// Interpret as a boolean. Only `true`/`false` (any case) are accepted.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Self::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Fully resolved configuration for one delivery method.
///
/// Two settings values are the same iff every key holds the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider identifier (`mandrill`, `sparkpost`, `sendgrid`, ...)
    pub provider_name: Option<String>,
    pub api_key: Option<String>,
    /// Ask the provider to send asynchronously, where supported
    #[serde(rename = "async")]
    pub async_send: bool,
    pub auto_html: Option<bool>,
    pub auto_text: Option<bool>,
    pub important: Option<bool>,
    pub inline_css: Option<bool>,
    pub track_clicks: Option<bool>,
    pub track_opens: Option<bool>,
    pub track_url_without_query_string: Option<bool>,
    pub log_content: Option<bool>,
    pub bcc_address: Option<String>,
    pub return_path_domain: Option<String>,
    pub signing_domain: Option<String>,
    pub subaccount: Option<String>,
    pub tracking_domain: Option<String>,
    /// Comma-separated tags appended to the message's own tags
    pub tags: Option<String>,
    /// Sender used when the message has no `From` header
    pub from: Option<String>,
    /// Reply-To used when the message has no `Reply-To` header
    pub reply_to: Option<String>,
    /// Return the provider response from `deliver`
    pub return_response: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_name: None,
            api_key: None,
            async_send: false,
            auto_html: None,
            auto_text: None,
            important: None,
            inline_css: None,
            track_clicks: None,
            track_opens: None,
            track_url_without_query_string: None,
            log_content: None,
            bcc_address: None,
            return_path_domain: None,
            signing_domain: None,
            subaccount: None,
            tracking_domain: None,
            tags: None,
            from: None,
            reply_to: None,
            return_response: true,
        }
    }
}

impl Settings {
    /// Built-in defaults plus provider name and API key from the environment.
    pub fn from_env() -> Self {
        Self {
            provider_name: env::var(PROVIDER_ENV).ok(),
            api_key: env::var(API_KEY_ENV).ok(),
            ..Self::default()
        }
    }

    /// Resolve call-site options over process-wide settings.
    ///
    /// Each key takes the call-site value when present, else the
    /// process-wide value (which starts out as the built-in default).
    pub fn resolve(process: &Settings, call_site: &Options) -> Result<Settings, MailError> {
        let mut resolved = process.clone();
        for (key, value) in call_site.iter() {
            resolved.set(*key, value.clone())?;
        }
        Ok(resolved)
    }

    /// The API key for `provider`. Unset or blank keys are missing.
    pub fn require_api_key(&self, provider: &'static str) -> Result<String, MailError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .ok_or(MailError::MissingCredential(provider))
    }

    /// Whether both settings hold the same value for every key.
    pub fn same_options(&self, other: &Settings) -> bool {
        self == other
    }

    /// Value of a key, `None` when unset.
    pub fn get(&self, key: OptionKey) -> Option<OptionValue> {
        match key {
            OptionKey::Async => Some(OptionValue::Bool(self.async_send)),
            OptionKey::ReturnResponse => Some(OptionValue::Bool(self.return_response)),
            _ if key.is_bool() => self.bool_slot(key).and_then(|slot| *slot).map(OptionValue::Bool),
            _ => self
                .text_slot(key)
                .and_then(|slot| slot.clone())
                .map(OptionValue::Text),
        }
    }

    /// Set a key from a generic value.
    ///
    /// Boolean keys accept `Bool` or the strings `"true"`/`"false"`.
    /// String keys store the value's string form.
    pub fn set(&mut self, key: OptionKey, value: impl Into<OptionValue>) -> Result<(), MailError> {
        let value = value.into();

        if key.is_bool() {
            let flag = value.as_bool().ok_or_else(|| {
                MailError::Configuration(format!("{} expects true or false, got '{}'", key, value))
            })?;
            match key {
                OptionKey::Async => self.async_send = flag,
                OptionKey::ReturnResponse => self.return_response = flag,
                _ => {
                    if let Some(slot) = self.bool_slot_mut(key) {
                        *slot = Some(flag);
                    }
                }
            }
        } else if let Some(slot) = self.text_slot_mut(key) {
            *slot = Some(value.to_string());
        }
        Ok(())
    }

    /// Reset a key to its built-in default.
    pub fn unset(&mut self, key: OptionKey) {
        match key {
            OptionKey::Async => self.async_send = false,
            OptionKey::ReturnResponse => self.return_response = true,
            _ => {
                if let Some(slot) = self.bool_slot_mut(key) {
                    *slot = None;
                } else if let Some(slot) = self.text_slot_mut(key) {
                    *slot = None;
                }
            }
        }
    }

    fn bool_slot(&self, key: OptionKey) -> Option<&Option<bool>> {
        Some(match key {
            OptionKey::AutoHtml => &self.auto_html,
            OptionKey::AutoText => &self.auto_text,
            OptionKey::Important => &self.important,
            OptionKey::InlineCss => &self.inline_css,
            OptionKey::TrackClicks => &self.track_clicks,
            OptionKey::TrackOpens => &self.track_opens,
            OptionKey::TrackUrlWithoutQueryString => &self.track_url_without_query_string,
            OptionKey::LogContent => &self.log_content,
            _ => return None,
        })
    }

    fn bool_slot_mut(&mut self, key: OptionKey) -> Option<&mut Option<bool>> {
        Some(match key {
            OptionKey::AutoHtml => &mut self.auto_html,
            OptionKey::AutoText => &mut self.auto_text,
            OptionKey::Important => &mut self.important,
            OptionKey::InlineCss => &mut self.inline_css,
            OptionKey::TrackClicks => &mut self.track_clicks,
            OptionKey::TrackOpens => &mut self.track_opens,
            OptionKey::TrackUrlWithoutQueryString => &mut self.track_url_without_query_string,
            OptionKey::LogContent => &mut self.log_content,
            _ => return None,
        })
    }

    fn text_slot(&self, key: OptionKey) -> Option<&Option<String>> {
        Some(match key {
            OptionKey::ProviderName => &self.provider_name,
            OptionKey::ApiKey => &self.api_key,
            OptionKey::BccAddress => &self.bcc_address,
            OptionKey::ReturnPathDomain => &self.return_path_domain,
            OptionKey::SigningDomain => &self.signing_domain,
            OptionKey::Subaccount => &self.subaccount,
            OptionKey::TrackingDomain => &self.tracking_domain,
            OptionKey::Tags => &self.tags,
            OptionKey::From => &self.from,
            OptionKey::ReplyTo => &self.reply_to,
            _ => return None,
        })
    }

    fn text_slot_mut(&mut self, key: OptionKey) -> Option<&mut Option<String>> {
        Some(match key {
            OptionKey::ProviderName => &mut self.provider_name,
            OptionKey::ApiKey => &mut self.api_key,
            OptionKey::BccAddress => &mut self.bcc_address,
            OptionKey::ReturnPathDomain => &mut self.return_path_domain,
            OptionKey::SigningDomain => &mut self.signing_domain,
            OptionKey::Subaccount => &mut self.subaccount,
            OptionKey::TrackingDomain => &mut self.tracking_domain,
            OptionKey::Tags => &mut self.tags,
            OptionKey::From => &mut self.from,
            OptionKey::ReplyTo => &mut self.reply_to,
            _ => return None,
        })
    }
}

/// Call-site overrides, applied on top of process-wide settings.
///
/// ```
/// use courier::{OptionKey, Options};
///
/// let options = Options::new()
///     .set(OptionKey::ProviderName, "sparkpost")
///     .set(OptionKey::ApiKey, "1234")
///     .set(OptionKey::TrackOpens, true);
/// assert_eq!(options.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl Options {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a key.
    pub fn set(mut self, key: OptionKey, value: impl Into<OptionValue>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// The override for a key, if any.
    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overrides in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&OptionKey, &OptionValue)> {
        self.values.iter()
    }
}
