//! Route definitions for `/wiki`.

use axum::routing::{get, post};
use axum::Router;
use kwiki_db::repositories::{AgencyRepo, GroupRepo, MemberRepo, SongRepo, WikiResource};

use crate::handlers::wiki::{self, agency, group, member, song};
use crate::state::AppState;

/// Review workflow routes shared by every resource kind.
///
/// ```text
/// POST /{id}/drafts               -> start_editing
/// POST /drafts/{id}/submit        -> submit
/// POST /drafts/{id}/approve       -> approve
/// POST /drafts/{id}/reject        -> reject
/// POST /drafts/{id}/publish       -> publish
/// POST /drafts/{id}/translate     -> translate
/// ```
fn workflow<R>() -> Router<AppState>
where
    R: WikiResource + Send + Sync + 'static,
{
    Router::new()
        .route("/{id}/drafts", post(wiki::start_editing::<R>))
        .route("/drafts/{id}/submit", post(wiki::submit::<R>))
        .route("/drafts/{id}/approve", post(wiki::approve::<R>))
        .route("/drafts/{id}/reject", post(wiki::reject::<R>))
        .route("/drafts/{id}/publish", post(wiki::publish::<R>))
        .route("/drafts/{id}/translate", post(wiki::translate::<R>))
}

/// Routes mounted at `/wiki`.
pub fn router() -> Router<AppState> {
    let agencies = Router::new()
        .route("/", get(agency::list))
        .route("/{id}", get(agency::get_by_id))
        .route("/drafts", get(agency::list_drafts).post(agency::create_draft))
        .route(
            "/drafts/{id}",
            get(agency::get_draft).put(agency::update_draft),
        )
        .merge(workflow::<AgencyRepo>());

    let groups = Router::new()
        .route("/", get(group::list))
        .route("/{id}", get(group::get_by_id))
        .route("/{id}/members", get(member::list_by_group))
        .route("/drafts", get(group::list_drafts).post(group::create_draft))
        .route("/drafts/{id}", get(group::get_draft).put(group::update_draft))
        .merge(workflow::<GroupRepo>());

    let members = Router::new()
        .route("/", get(member::list))
        .route("/{id}", get(member::get_by_id))
        .route("/drafts", get(member::list_drafts).post(member::create_draft))
        .route(
            "/drafts/{id}",
            get(member::get_draft).put(member::update_draft),
        )
        .merge(workflow::<MemberRepo>());

    let songs = Router::new()
        .route("/", get(song::list))
        .route("/{id}", get(song::get_by_id))
        .route("/drafts", get(song::list_drafts).post(song::create_draft))
        .route("/drafts/{id}", get(song::get_draft).put(song::update_draft))
        .merge(workflow::<SongRepo>());

    Router::new()
        .nest("/agencies", agencies)
        .nest("/groups", groups)
        .nest("/members", members)
        .nest("/songs", songs)
}
