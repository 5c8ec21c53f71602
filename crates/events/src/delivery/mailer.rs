//! Mail sending that degrades to logging when SMTP is not configured.

use crate::delivery::email::{EmailConfig, EmailDelivery, EmailError};
use crate::delivery::templates::OutgoingMail;

/// Optional SMTP transport.
pub struct Mailer {
    delivery: Option<EmailDelivery>,
}

impl Mailer {
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self {
            delivery: config.map(EmailDelivery::new),
        }
    }

    /// Build from `SMTP_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(EmailConfig::from_env())
    }

    /// A mailer that never sends.
    pub fn disabled() -> Self {
        Self { delivery: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.delivery.is_some()
    }

    /// Send a mail, or log and skip it when SMTP is not configured.
    pub async fn send(&self, to_email: &str, mail: &OutgoingMail) -> Result<(), EmailError> {
        match &self.delivery {
            Some(delivery) => delivery.send(to_email, mail).await,
            None => {
                tracing::info!(
                    to = to_email,
                    subject = %mail.subject,
                    "SMTP not configured, mail skipped"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::templates;
    use kwiki_core::language::Language;

    #[tokio::test]
    async fn disabled_mailer_skips_without_error() {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());
        let mail = templates::registration_conflict(Language::Ko);
        assert!(mailer.send("someone@example.com", &mail).await.is_ok());
    }
}
