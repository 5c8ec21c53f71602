//! Route definitions for the `/identity` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::identity;
use crate::state::AppState;

/// Routes mounted at `/identity`.
///
/// ```text
/// POST /auth-codes                        -> request_auth_code
/// POST /register                          -> register
/// POST /login                             -> login
/// POST /refresh                           -> refresh
/// POST /logout                            -> logout (requires auth)
/// GET  /me                                -> me
/// PUT  /principals/{identity_id}/role     -> update_principal_role (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth-codes", post(identity::request_auth_code))
        .route("/register", post(identity::register))
        .route("/login", post(identity::login))
        .route("/refresh", post(identity::refresh))
        .route("/logout", post(identity::logout))
        .route("/me", get(identity::me))
        .route(
            "/principals/{identity_id}/role",
            put(identity::update_principal_role),
        )
}
