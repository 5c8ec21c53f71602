use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kwiki_api::config::ServerConfig;
use kwiki_api::router::build_app_router;
use kwiki_api::state::AppState;
use kwiki_api::background;
use kwiki_events::{EventBus, Mailer, Notifier};
use kwiki_payments::{PaymentGateway, StripeConfig, StripeGateway};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kwiki_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = kwiki_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    kwiki_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    kwiki_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Payment gateway ---
    let stripe = StripeConfig::from_env().expect("STRIPE_SECRET_KEY must be set");
    let gateway: Arc<dyn PaymentGateway> =
        Arc::new(StripeGateway::new(stripe).expect("Failed to build Stripe client"));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let mailer = Arc::new(Mailer::from_env());
    if !mailer.is_enabled() {
        tracing::warn!("SMTP_HOST not set; outgoing mail will only be logged");
    }
    let notifier_handle = tokio::spawn(Notifier::run(mailer, event_bus.subscribe()));

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let cleanup_handle = tokio::spawn(background::auth_code_cleanup::run(
        pool.clone(),
        cancel.clone(),
    ));
    tracing::info!("Background services started (notifier, auth code cleanup)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        gateway,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    let _ = tokio::time::timeout(grace, cleanup_handle).await;

    // Dropping the last sender closes the channel and ends the notifier.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, notifier_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
