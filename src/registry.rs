//! Provider lookup by name.
//!
//! Names are normalized before lookup: underscores separate words, each
//! word is capitalized, and the words are joined (`sparkpost` becomes
//! `Sparkpost`, `fake_service` becomes `FakeService`).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::MailError;
use crate::provider::Provider;
use crate::providers::{MandrillProvider, SendGridProvider, SparkPostProvider};
use crate::settings::Settings;
use crate::transport::Transport;

/// Builds a provider from resolved settings.
pub type ProviderFactory =
    Arc<dyn Fn(&Settings, Arc<dyn Transport>) -> Result<Box<dyn Provider>, MailError> + Send + Sync>;

/// Map from normalized provider name to factory.
///
/// [`Registry::default`] knows `mandrill`, `sparkpost` and `sendgrid`.
///
/// ```
/// use courier::Registry;
///
/// let registry = Registry::default();
/// assert!(registry.contains("sparkpost"));
/// assert!(registry.resolve(Some("unknown_x")).is_err());
/// assert!(registry.resolve(None).is_err());
/// ```
#[derive(Clone)]
pub struct Registry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl Registry {
    /// A registry with no providers.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a provider factory under a name, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&Settings, Arc<dyn Transport>) -> Result<Box<dyn Provider>, MailError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(camelize(name), Arc::new(factory));
        self
    }

    /// Whether a name resolves to a registered provider.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&camelize(name))
    }

    /// Normalized names of every registered provider.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Look up the factory for a provider name.
    ///
    /// Fails with [`MailError::InvalidProvider`] when the name is unset,
    /// blank, or not registered.
    pub fn resolve(&self, name: Option<&str>) -> Result<ProviderFactory, MailError> {
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => return Err(MailError::InvalidProvider("provider name is not set".into())),
        };

        let key = camelize(name);
        tracing::debug!(provider = name, lookup = %key, "Resolving provider");

        match self.factories.get(&key) {
            Some(factory) => Ok(Arc::clone(factory)),
            None => {
                tracing::warn!(provider = name, "Unknown email provider");
                Err(MailError::InvalidProvider(name.to_string()))
            }
        }
    }

    /// Resolve a name and build the provider.
    pub fn build(
        &self,
        settings: &Settings,
        transport: Arc<dyn Transport>,
    ) -> Result<Box<dyn Provider>, MailError> {
        let factory = self.resolve(settings.provider_name.as_deref())?;
        factory(settings, transport)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("mandrill", |settings, transport| {
                Ok(Box::new(MandrillProvider::from_settings(settings, transport)?))
            })
            .register("sparkpost", |settings, transport| {
                Ok(Box::new(SparkPostProvider::from_settings(settings, transport)?))
            })
            .register("sendgrid", |settings, transport| {
                Ok(Box::new(SendGridProvider::from_settings(settings, transport)?))
            });
        registry
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.names())
            .finish()
    }
}

/// Normalize a provider name to its lookup key.
pub fn camelize(name: &str) -> String {
    name.split('_')
        .flat_map(str::split_whitespace)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
