//! Application-owned configuration holder.

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;

use crate::delivery::DeliveryMethod;
use crate::error::MailError;
use crate::registry::Registry;
use crate::settings::{Options, Settings};
use crate::source::MailSource;
use crate::transport::Transport;

/// Holds the process-wide settings, the provider registry and the
/// transport, and hands out delivery methods built from them.
///
/// The delivery method for the current settings is cached and reused for
/// as long as the settings stay the same; any change through
/// [`configure`](Self::configure) or [`reset`](Self::reset) makes the next
/// call build a fresh one.
///
/// ```rust,ignore
/// use courier::{Courier, Email};
///
/// // COURIER_PROVIDER=sparkpost COURIER_API_KEY=xxxx
/// let courier = Courier::from_env();
/// courier.configure(|s| s.track_opens = Some(true));
///
/// let email = Email::new()
///     .from("John Doe <john@example.com>")
///     .to("jane@example.com")
///     .subject("Welcome!")
///     .html_body("<h1>Hello</h1>");
///
/// courier.deliver(&email).await?;
/// ```
pub struct Courier {
    settings: RwLock<Settings>,
    cached: Mutex<Option<Arc<DeliveryMethod>>>,
    registry: Registry,
    transport: Arc<dyn Transport>,
}

impl Courier {
    /// Create a holder with explicit settings and transport, using the
    /// default registry.
    pub fn new(settings: Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: RwLock::new(settings),
            cached: Mutex::new(None),
            registry: Registry::default(),
            transport,
        }
    }

    /// Settings from the environment, sent over HTTP.
    #[cfg(feature = "http")]
    pub fn from_env() -> Self {
        Self::new(
            Settings::from_env(),
            Arc::new(crate::transport::HttpTransport::new()),
        )
    }

    /// Replace the provider registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        *self.cached.get_mut() = None;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutate the process-wide settings.
    pub fn configure<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings.write());
    }

    /// Restore settings to [`Settings::from_env`].
    pub fn reset(&self) {
        *self.settings.write() = Settings::from_env();
    }

    /// Snapshot of the current process-wide settings.
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// The delivery method for the current settings.
    ///
    /// Returns the cached one when it was built from settings equal to the
    /// current ones.
    pub fn delivery_method(&self) -> Result<Arc<DeliveryMethod>, MailError> {
        let current = self.settings();
        let mut cached = self.cached.lock();

        if let Some(method) = cached.as_ref() {
            if method.settings().same_options(&current) {
                return Ok(Arc::clone(method));
            }
        }

        tracing::debug!(provider = ?current.provider_name, "Building delivery method");
        let method = Arc::new(DeliveryMethod::new(
            current,
            &self.registry,
            Arc::clone(&self.transport),
        )?);
        *cached = Some(Arc::clone(&method));
        Ok(method)
    }

    /// A fresh delivery method with call-site overrides on top of the
    /// current settings. Never cached.
    pub fn delivery_method_with(&self, options: &Options) -> Result<DeliveryMethod, MailError> {
        let settings = Settings::resolve(&self.settings(), options)?;
        DeliveryMethod::new(settings, &self.registry, Arc::clone(&self.transport))
    }

    /// Deliver through the delivery method for the current settings.
    pub async fn deliver<M: MailSource>(&self, mail: &M) -> Result<Option<Value>, MailError> {
        let method = self.delivery_method()?;
        method.deliver(mail).await
    }
}

impl std::fmt::Debug for Courier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Courier")
            .field("settings", &*self.settings.read())
            .field("registry", &self.registry)
            .finish()
    }
}
