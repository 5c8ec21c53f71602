//! Route definitions for `/accounts`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{account, affiliation};
use crate::state::AppState;

/// Routes mounted at `/accounts`.
///
/// ```text
/// GET    /                                    -> list_mine
/// POST   /                                    -> create
/// GET    /{id}                                -> get_by_id
/// GET    /{id}/members                        -> list_members
/// POST   /{id}/members                        -> add_member
/// PUT    /{id}/members/{identity_id}          -> update_member_role
/// DELETE /{id}/members/{identity_id}          -> remove_member
/// GET    /{id}/affiliations                   -> affiliation::list_for_account
/// POST   /affiliations                        -> affiliation::request
/// GET    /affiliations/{id}                   -> affiliation::get_by_id
/// POST   /affiliations/{id}/approve           -> affiliation::approve
/// POST   /affiliations/{id}/reject            -> affiliation::reject
/// POST   /affiliations/{id}/terminate         -> affiliation::terminate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account::list_mine).post(account::create))
        .route("/{id}", get(account::get_by_id))
        .route(
            "/{id}/members",
            get(account::list_members).post(account::add_member),
        )
        .route(
            "/{id}/members/{identity_id}",
            put(account::update_member_role).delete(account::remove_member),
        )
        .route("/{id}/affiliations", get(affiliation::list_for_account))
        .route("/affiliations", post(affiliation::request))
        .route("/affiliations/{id}", get(affiliation::get_by_id))
        .route("/affiliations/{id}/approve", post(affiliation::approve))
        .route("/affiliations/{id}/reject", post(affiliation::reject))
        .route("/affiliations/{id}/terminate", post(affiliation::terminate))
}
