//! The delivery method: one resolved provider plus the settings it was
//! built from.

use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::error::MailError;
use crate::message::Message;
use crate::provider::Provider;
use crate::registry::Registry;
use crate::settings::Settings;
use crate::source::{AddressField, MailSource};
use crate::transport::Transport;

/// Delivers messages through the provider named by its settings.
///
/// The provider is resolved and constructed when the delivery method is
/// built, so an unknown provider or a missing API key is reported before
/// any message is touched.
///
/// ```
/// use courier::testing::RecordingTransport;
/// use courier::{DeliveryMethod, Email, Registry, Settings};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let transport = Arc::new(RecordingTransport::with_response(json!({"id": 1})));
/// let settings = Settings {
///     provider_name: Some("sparkpost".into()),
///     api_key: Some("1234".into()),
///     ..Settings::default()
/// };
/// let method = DeliveryMethod::new(settings, &Registry::default(), transport.clone()).unwrap();
///
/// let email = Email::new().from("a@example.com").to("b@example.com").subject("Hi");
/// let response = method.deliver(&email).await.unwrap();
/// assert_eq!(response, Some(json!({"id": 1})));
/// assert_eq!(transport.request_count(), 1);
/// # }
/// ```
pub struct DeliveryMethod {
    settings: Settings,
    provider: Box<dyn Provider>,
    response: Mutex<Option<Value>>,
}

impl DeliveryMethod {
    /// Resolve the provider named in `settings` and build it.
    pub fn new(
        settings: Settings,
        registry: &Registry,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, MailError> {
        let provider = registry.build(&settings, transport)?;
        Ok(Self::with_provider(settings, provider))
    }

    /// Wrap an already built provider.
    pub fn with_provider(settings: Settings, provider: Box<dyn Provider>) -> Self {
        Self {
            settings,
            provider,
            response: Mutex::new(None),
        }
    }

    /// The settings this delivery method was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Raw response of the most recent successful delivery.
    pub fn response(&self) -> Option<Value> {
        self.response.lock().clone()
    }

    /// Build the provider payload for `mail` and send it.
    ///
    /// The raw provider response is stored (see [`response`](Self::response))
    /// and returned when `return_response` is set. Errors from the
    /// transport are returned unchanged.
    pub async fn deliver<M: MailSource>(&self, mail: &M) -> Result<Option<Value>, MailError> {
        let provider = self.provider.provider_name();

        let (payload, to, subject) = {
            let message = Message::new(mail, &self.settings);
            let to: Vec<String> = message
                .recipients(AddressField::To)
                .into_iter()
                .map(|a| a.email)
                .collect();
            (self.provider.build_payload(&message)?, to, message.subject())
        };

        let span = tracing::info_span!(
            "courier.deliver",
            provider = provider,
            delivery_id = %uuid::Uuid::new_v4(),
            to = ?to,
            subject = subject.as_deref().unwrap_or_default(),
        );

        async move {
            tracing::debug!("Delivering email");

            #[cfg(feature = "metrics")]
            let start = Instant::now();

            let result = self.provider.send(payload).await;

            #[cfg(feature = "metrics")]
            {
                let duration = start.elapsed().as_secs_f64();
                let status = if result.is_ok() { "success" } else { "error" };
                metrics::counter!("courier_deliveries_total", "provider" => provider, "status" => status)
                    .increment(1);
                metrics::histogram!("courier_delivery_duration_seconds", "provider" => provider)
                    .record(duration);
            }

            match result {
                Ok(response) => {
                    tracing::info!("Email delivered");
                    *self.response.lock() = Some(response.clone());
                    Ok(self.settings.return_response.then_some(response))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Email delivery failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryMethod")
            .field("provider", &self.provider.provider_name())
            .field("settings", &self.settings)
            .finish()
    }
}
