//! Route definitions for `/site`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{announcement, contact};
use crate::state::AppState;

/// Routes mounted at `/site`.
///
/// ```text
/// GET    /announcements                 -> announcement::list
/// GET    /announcements/{id}            -> announcement::get_by_id
/// POST   /contacts                      -> contact::create
/// GET    /admin/announcements           -> announcement::admin_list
/// POST   /admin/announcements           -> announcement::create
/// PUT    /admin/announcements/{id}      -> announcement::update
/// DELETE /admin/announcements/{id}      -> announcement::delete
/// GET    /admin/contacts                -> contact::list
/// GET    /admin/contacts/{id}           -> contact::get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/announcements", get(announcement::list))
        .route("/announcements/{id}", get(announcement::get_by_id))
        .route("/contacts", post(contact::create))
        .route(
            "/admin/announcements",
            get(announcement::admin_list).post(announcement::create),
        )
        .route(
            "/admin/announcements/{id}",
            put(announcement::update).delete(announcement::delete),
        )
        .route("/admin/contacts", get(contact::list))
        .route("/admin/contacts/{id}", get(contact::get_by_id))
}
