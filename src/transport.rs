//! Transport seam between the providers and the network.
//!
//! Providers only build an [`ApiRequest`]; a [`Transport`] puts it on the
//! wire and hands back the provider's raw response. [`HttpTransport`] is
//! the `reqwest` implementation; tests use
//! [`RecordingTransport`](crate::testing::RecordingTransport).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MailError;
use crate::payload::Payload;

/// A fully addressed provider API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Provider identifier, used for errors and logs
    pub provider: &'static str,
    pub url: String,
    /// Extra headers (authorization, ...)
    pub headers: Vec<(String, String)>,
    pub payload: Payload,
}

impl ApiRequest {
    pub fn new(provider: &'static str, url: impl Into<String>, payload: Payload) -> Self {
        Self {
            provider,
            url: url.into(),
            headers: Vec::new(),
            payload,
        }
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value with the given name, case-insensitive.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Sends provider requests.
///
/// Implementations return the response body verbatim and map non-success
/// statuses to [`MailError::ProviderError`]. They never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, MailError>;
}

/// Interpret a response body: empty is `null`, non-JSON is a string.
pub(crate) fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Human-readable error from a provider error body.
///
/// `errors` details win over a top-level `message`.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    let messages: Vec<&str> = body
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str).or_else(|| e.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if !messages.is_empty() {
        return Some(messages.join("; "));
    }
    body.get("message").and_then(Value::as_str).map(String::from)
}

#[cfg(feature = "http")]
pub use self::http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use reqwest::multipart::{Form, Part};
    use reqwest::Client;
    use serde_json::Value;

    use super::{error_message, parse_body, ApiRequest, Transport};
    use crate::error::MailError;
    use crate::payload::{FormPart, Payload};

    /// `reqwest`-backed transport.
    #[derive(Debug, Clone, Default)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Create with a custom reqwest client.
        pub fn with_client(client: Client) -> Self {
            Self { client }
        }

        fn form(parts: Vec<FormPart>) -> Result<Form, MailError> {
            let mut form = Form::new();
            for part in parts {
                form = match part {
                    FormPart::Text { name, value } => form.text(name, value),
                    FormPart::File { name, upload } => {
                        let file = Part::bytes(upload.data)
                            .file_name(upload.filename)
                            .mime_str(&upload.content_type)?;
                        form.part(name, file)
                    }
                };
            }
            Ok(form)
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, MailError> {
            let ApiRequest {
                provider,
                url,
                headers,
                payload,
            } = request;

            let mut req = self
                .client
                .post(&url)
                .header("User-Agent", format!("courier/{}", crate::VERSION));
            for (name, value) in &headers {
                req = req.header(name.as_str(), value.as_str());
            }

            req = match payload {
                Payload::Json(body) => req.json(&body),
                Payload::Form(parts) => req.multipart(Self::form(parts)?),
            };

            tracing::debug!(provider, url = %url, "Sending provider request");
            let response = req.send().await?;
            let status = response.status();
            let body = parse_body(&response.text().await?);

            if status.is_success() {
                Ok(body)
            } else {
                let message = error_message(&body)
                    .or_else(|| body.as_str().map(String::from))
                    .unwrap_or_else(|| status.to_string());
                Err(MailError::provider_with_status(
                    provider,
                    message,
                    status.as_u16(),
                ))
            }
        }
    }
}
