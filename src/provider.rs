//! Provider adapter trait.
//!
//! An adapter pairs a message builder with a transport call for one
//! provider API. It is built from resolved [`Settings`](crate::Settings)
//! and holds nothing else but the API key and the options it needs at
//! send time.
//!
//! `#[async_trait]` keeps the trait object safe: the registry hands out
//! `Box<dyn Provider>` so the provider is chosen from configuration at
//! runtime.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MailError;
use crate::message::Message;
use crate::payload::Payload;

/// A transactional email API.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use courier::{MailError, Message, Payload, Provider};
/// use serde_json::{json, Value};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Provider for Echo {
///     fn provider_name(&self) -> &'static str {
///         "echo"
///     }
///
///     fn build_payload(&self, message: &Message<'_>) -> Result<Payload, MailError> {
///         Ok(Payload::Json(json!({ "subject": message.subject() })))
///     }
///
///     async fn send(&self, payload: Payload) -> Result<Value, MailError> {
///         Ok(payload.as_json().cloned().unwrap_or(Value::Null))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (for logs, metrics and errors).
    fn provider_name(&self) -> &'static str;

    /// Translate a message into this provider's wire payload.
    ///
    /// Absent optional data never fails; errors only come from
    /// serialization.
    fn build_payload(&self, message: &Message<'_>) -> Result<Payload, MailError>;

    /// Send a payload built by [`build_payload`](Self::build_payload) and
    /// return the raw provider response.
    async fn send(&self, payload: Payload) -> Result<Value, MailError>;
}
