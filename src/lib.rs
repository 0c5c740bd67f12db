//! # Courier
//!
//! Deliver email through Mandrill, SparkPost or SendGrid behind one
//! delivery method.
//!
//! A message (built with [`Email`] or parsed from raw MIME with
//! [`MimeMessage`]) is combined with resolved [`Settings`] into a
//! [`Message`] view. The provider named in the settings is looked up in
//! the [`Registry`], translates the view into its own wire payload, and
//! sends it through a [`Transport`].
//!
//! ## Quick Start
//!
//! Set environment variables:
//! ```bash
//! COURIER_PROVIDER=mandrill
//! COURIER_API_KEY=md-xxxxx
//! ```
//!
//! Then deliver:
//! ```rust,ignore
//! use courier::{Courier, Email};
//!
//! let courier = Courier::from_env();
//!
//! let email = Email::new()
//!     .from("Sender <noreply@example.com>")
//!     .to("user@example.com")
//!     .subject("Welcome!")
//!     .text_body("Hello")
//!     .html_body("<p>Hello</p>")
//!     .option("track_opens", true);
//!
//! let response = courier.deliver(&email).await?;
//! ```
//!
//! ## Per-Call Overrides
//!
//! ```rust,ignore
//! use courier::{OptionKey, Options};
//!
//! let method = courier.delivery_method_with(
//!     &Options::new()
//!         .set(OptionKey::ProviderName, "sparkpost")
//!         .set(OptionKey::ApiKey, "sp-xxxxx"),
//! )?;
//! method.deliver(&email).await?;
//! ```
//!
//! ## Option Precedence
//!
//! For every provider option, highest first:
//!
//! 1. The message itself (a header or [`Email::option`])
//! 2. Call-site [`Options`]
//! 3. Process-wide settings held by [`Courier`]
//! 4. Built-in defaults
//!
//! ## Feature Flags
//!
//! - `http` (default) - [`HttpTransport`] via reqwest
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `courier_deliveries_total` | Counter | provider, status | Total deliveries |
//! | `courier_delivery_duration_seconds` | Histogram | provider | Delivery duration |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the courier crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod address;
mod attachment;
mod courier;
mod delivery;
mod email;
mod error;
mod message;
mod mime;
mod payload;
mod provider;
mod registry;
mod settings;
mod source;
mod transport;

pub mod providers;
pub mod testing;

// Re-exports
pub use address::Address;
pub use attachment::{encode64, Attachment, AttachmentType};
pub use courier::Courier;
pub use delivery::DeliveryMethod;
pub use email::Email;
pub use error::MailError;
pub use message::{AttachmentFilter, EncodedAttachment, Message};
pub use mime::MimeMessage;
pub use payload::{FormPart, Payload, UploadIo};
pub use provider::Provider;
pub use registry::{camelize, ProviderFactory, Registry};
pub use settings::{OptionKey, OptionValue, Options, Settings, API_KEY_ENV, PROVIDER_ENV};
pub use source::{AddressField, MailSource};
pub use transport::{ApiRequest, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

/// Prelude for convenient imports.
///
/// ```rust
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Address, Attachment, Courier, DeliveryMethod, Email, MailError, MailSource, Message,
        MimeMessage, OptionKey, Options, Provider, Registry, Settings,
    };
}
