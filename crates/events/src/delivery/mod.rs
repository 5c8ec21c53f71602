//! Outbound mail: SMTP transport, the optional-mailer wrapper and the
//! localized templates.

pub mod email;
pub mod mailer;
pub mod templates;
