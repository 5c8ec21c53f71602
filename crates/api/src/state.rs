use std::sync::Arc;

use kwiki_events::EventBus;
use kwiki_payments::PaymentGateway;

use crate::config::ServerConfig;

/// Shared state handed to every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: kwiki_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub event_bus: Arc<EventBus>,
    /// Stripe in production; an in-memory double in tests.
    pub gateway: Arc<dyn PaymentGateway>,
}
