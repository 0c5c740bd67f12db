//! Error types for courier.

use thiserror::Error;

/// Errors that can occur when resolving a provider or delivering an email.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// Provider name is unset, empty, or not registered.
    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    /// The provider requires an API key and none was configured.
    #[error("Missing API key for provider: {0}")]
    MissingCredential(&'static str),

    /// Configuration error (invalid value for a key, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Raw message could not be parsed.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Provider-specific error with details.
    #[error("Provider error ({provider}): {message}")]
    ProviderError {
        provider: &'static str,
        message: String,
        /// Optional HTTP status code
        status: Option<u16>,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl MailError {
    /// Create a provider-specific error.
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: None,
        }
    }

    /// Create a provider error with HTTP status.
    pub fn provider_with_status(
        provider: &'static str,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: Some(status),
        }
    }

    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderError { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<mailparse::MailParseError> for MailError {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::InvalidMessage(err.to_string())
    }
}
