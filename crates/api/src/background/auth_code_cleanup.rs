//! Hourly purge of expired and consumed registration codes.

use std::time::Duration;

use kwiki_db::repositories::AuthCodeRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the purge loop until `cancel` fires.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Auth code cleanup started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Auth code cleanup stopping");
                break;
            }
            _ = interval.tick() => {
                match AuthCodeRepo::purge_expired(&pool).await {
                    Ok(0) => tracing::debug!("Auth code cleanup: nothing to purge"),
                    Ok(deleted) => tracing::info!(deleted, "Auth code cleanup: purged codes"),
                    Err(e) => tracing::error!(error = %e, "Auth code cleanup failed"),
                }
            }
        }
    }
}
