//! Route definitions for `/monetization`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{payment, settlement};
use crate::state::AppState;

/// Routes mounted at `/monetization`.
///
/// ```text
/// POST /payments                               -> payment::create
/// GET  /payments/{id}                          -> payment::get_by_id
/// POST /payments/{id}/capture                  -> payment::capture
/// POST /payments/{id}/cancel                   -> payment::cancel
/// POST /payments/{id}/refund                   -> payment::refund
/// GET  /accounts/{id}/payments                 -> payment::list_for_account
/// GET  /accounts/{id}/settlement-account       -> settlement::get_account
/// GET  /accounts/{id}/settlements/batches      -> settlement::list_batches
/// POST /settlement-accounts                    -> settlement::create_account
/// POST /settlements/batches                    -> settlement::create_batch (admin)
/// GET  /settlements/batches/{id}               -> settlement::get_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", post(payment::create))
        .route("/payments/{id}", get(payment::get_by_id))
        .route("/payments/{id}/capture", post(payment::capture))
        .route("/payments/{id}/cancel", post(payment::cancel))
        .route("/payments/{id}/refund", post(payment::refund))
        .route("/accounts/{id}/payments", get(payment::list_for_account))
        .route(
            "/accounts/{id}/settlement-account",
            get(settlement::get_account),
        )
        .route(
            "/accounts/{id}/settlements/batches",
            get(settlement::list_batches),
        )
        .route("/settlement-accounts", post(settlement::create_account))
        .route("/settlements/batches", post(settlement::create_batch))
        .route("/settlements/batches/{id}", get(settlement::get_batch))
}
