//! Event bus and outbound mail for the wiki platform.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope.
//! - [`delivery`] -- SMTP delivery and the localized mail templates.
//! - [`Notifier`] -- background subscriber that logs events and sends the
//!   mails identity events ask for.

pub mod bus;
pub mod delivery;
pub mod event_types;
pub mod notifier;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use delivery::mailer::Mailer;
pub use notifier::Notifier;
