//! Email provider implementations.
//!
//! Each provider implements the [`Provider`](crate::Provider) trait and is
//! registered under its name in the default [`Registry`](crate::Registry).
//!
//! ## Available Providers
//!
//! | Provider | Registry name | Description |
//! |----------|---------------|-------------|
//! | [`MandrillProvider`] | `mandrill` | Mandrill `messages/send` JSON API |
//! | [`SparkPostProvider`] | `sparkpost` | SparkPost `transmissions` JSON API |
//! | [`SendGridProvider`] | `sendgrid` | SendGrid `mail.send` form API |

mod mandrill;
pub use mandrill::{MandrillAttachment, MandrillMessage, MandrillProvider, MandrillRecipient};

mod sparkpost;
pub use sparkpost::{
    SparkPostAddress, SparkPostAttachment, SparkPostContent, SparkPostOptions, SparkPostProvider,
    SparkPostRecipient, SparkPostSender, SparkPostTransmission,
};

mod sendgrid;
pub use sendgrid::{SendGridMessage, SendGridProvider, SendGridUpload};
