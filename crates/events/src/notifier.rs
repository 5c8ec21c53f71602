//! Background subscriber that turns identity events into mails.
//!
//! Requesting an auth code only publishes an event, so the HTTP response is
//! the same whether or not the address is registered; the mail that goes out
//! differs and is sent from here.

use std::sync::Arc;

use tokio::sync::broadcast;
use kwiki_core::language::Language;

use crate::bus::PlatformEvent;
use crate::delivery::mailer::Mailer;
use crate::delivery::templates::{self, OutgoingMail};
use crate::event_types::{AUTH_CODE_ISSUED, REGISTRATION_CONFLICT};

/// Background service that logs every event and sends identity mails.
pub struct Notifier;

impl Notifier {
    /// Run the notification loop until the bus is dropped.
    pub async fn run(mailer: Arc<Mailer>, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        event_type = %event.event_type,
                        source = ?event.source_entity_type,
                        source_id = ?event.source_entity_id,
                        actor = ?event.actor_identity_id,
                        "Platform event"
                    );
                    if let Some((to, mail)) = mail_for(&event) {
                        if let Err(e) = mailer.send(to, &mail).await {
                            tracing::error!(
                                error = %e,
                                event_type = %event.event_type,
                                "Failed to send notification mail"
                            );
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notifier lagged, some events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notifier shutting down");
                    break;
                }
            }
        }
    }
}

/// The recipient and mail an event calls for, if any.
fn mail_for(event: &PlatformEvent) -> Option<(&str, OutgoingMail)> {
    let to = event.payload_str("email")?;
    let language = event
        .payload_str("language")
        .and_then(|l| l.parse::<Language>().ok())
        .unwrap_or(Language::En);

    match event.event_type.as_str() {
        AUTH_CODE_ISSUED => {
            let code = event.payload_str("code")?;
            let ttl_mins = event.payload.get("ttl_mins").and_then(|v| v.as_i64())?;
            Some((to, templates::auth_code(language, code, ttl_mins)))
        }
        REGISTRATION_CONFLICT => Some((to, templates::registration_conflict(language))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use serde_json::json;

    #[test]
    fn auth_code_event_yields_code_mail() {
        let event = PlatformEvent::new(AUTH_CODE_ISSUED).with_payload(json!({
            "email": "fan@example.com",
            "language": "ja",
            "code": "123456",
            "ttl_mins": 15,
        }));
        let (to, mail) = mail_for(&event).unwrap();
        assert_eq!(to, "fan@example.com");
        assert_eq!(mail, templates::auth_code(Language::Ja, "123456", 15));
    }

    #[test]
    fn conflict_event_yields_notice() {
        let event = PlatformEvent::new(REGISTRATION_CONFLICT)
            .with_payload(json!({"email": "fan@example.com", "language": "ko"}));
        let (_, mail) = mail_for(&event).unwrap();
        assert_eq!(mail, templates::registration_conflict(Language::Ko));
    }

    #[test]
    fn other_events_send_nothing() {
        let event = PlatformEvent::new("wiki.published")
            .with_payload(json!({"email": "fan@example.com"}));
        assert!(mail_for(&event).is_none());
    }

    #[test]
    fn malformed_code_event_sends_nothing() {
        let event = PlatformEvent::new(AUTH_CODE_ISSUED)
            .with_payload(json!({"email": "fan@example.com", "language": "en"}));
        assert!(mail_for(&event).is_none());
    }

    #[tokio::test]
    async fn run_exits_when_bus_dropped() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        let handle = tokio::spawn(Notifier::run(Arc::new(Mailer::disabled()), rx));

        bus.publish(
            PlatformEvent::new(REGISTRATION_CONFLICT)
                .with_payload(json!({"email": "fan@example.com", "language": "en"})),
        );
        drop(bus);

        handle.await.expect("notifier should stop cleanly");
    }
}
