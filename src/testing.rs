//! Test doubles.
//!
//! [`RecordingTransport`] stands in for the network: it records every
//! request a provider makes and answers with a canned response.
//!
//! # Example
//!
//! ```
//! use courier::testing::RecordingTransport;
//! use courier::{Courier, Email};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let transport = Arc::new(RecordingTransport::with_response(json!([{"status": "sent"}])));
//! let courier = Courier::new(Default::default(), transport.clone());
//! courier.configure(|s| {
//!     s.provider_name = Some("mandrill".into());
//!     s.api_key = Some("1234".into());
//! });
//!
//! courier.deliver(&Email::new().to("user@example.com")).await.unwrap();
//!
//! let request = transport.last_request().unwrap();
//! assert!(request.url.ends_with("/messages/send.json"));
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::MailError;
use crate::transport::{ApiRequest, Transport};

/// A request captured by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: ApiRequest,
    /// When the request was "sent".
    pub sent_at: DateTime<Utc>,
}

/// In-memory transport that records requests instead of sending them.
#[derive(Debug)]
pub struct RecordingTransport {
    requests: RwLock<Vec<RecordedRequest>>,
    response: RwLock<Value>,
    /// If set, send() will return this error (for testing error paths).
    fail_with: RwLock<Option<MailError>>,
}

impl RecordingTransport {
    /// Answers every request with `null`.
    pub fn new() -> Self {
        Self::with_response(Value::Null)
    }

    /// Answers every request with `response`.
    pub fn with_response(response: Value) -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
            response: RwLock::new(response),
            fail_with: RwLock::new(None),
        }
    }

    /// Change the canned response.
    pub fn set_response(&self, response: Value) {
        *self.response.write() = response;
    }

    /// Fail every request with `error` until cleared. Failed requests are
    /// still recorded.
    pub fn set_failure(&self, error: MailError) {
        *self.fail_with.write() = Some(error);
    }

    pub fn clear_failure(&self) {
        *self.fail_with.write() = None;
    }

    /// Recorded requests, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .read()
            .iter()
            .map(|recorded| recorded.request.clone())
            .collect()
    }

    /// Recorded requests with their timestamps, oldest first.
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.read().clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.read().last().map(|recorded| recorded.request.clone())
    }

    pub fn request_count(&self) -> usize {
        self.requests.read().len()
    }

    /// Forget every recorded request.
    pub fn clear(&self) {
        self.requests.write().clear();
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, MailError> {
        tracing::debug!(provider = request.provider, url = %request.url, "Recording provider request");
        self.requests.write().push(RecordedRequest {
            request,
            sent_at: Utc::now(),
        });

        if let Some(error) = self.fail_with.read().clone() {
            return Err(error);
        }
        Ok(self.response.read().clone())
    }
}
