//! Handlers for `/wiki/songs`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::policy::{authorize, WikiAction};
use kwiki_core::status::ApprovalStatus;
use kwiki_core::types::EntityId;
use kwiki_core::wiki::{self, ResourceKind};
use kwiki_db::models::song::{CreateSongDraft, DraftSong, Song, SongContent};
use kwiki_db::repositories::SongRepo;

use super::{
    concurrently_changed, draft_translation_set, ensure_may_edit, ensure_published,
    parse_status_filter, today,
};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{DraftListParams, WikiListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn validate(content: &SongContent) -> Result<(), CoreError> {
    wiki::validate_song(
        &content.name,
        content.lyricist.as_deref(),
        content.composer.as_deref(),
        content.release_date,
        content.overview.as_deref(),
        content.cover_image_path.as_deref(),
        today(),
    )
}

async fn check_references(state: &AppState, content: &SongContent) -> AppResult<()> {
    ensure_published(&state.pool, ResourceKind::Agency, content.agency_id).await?;
    ensure_published(&state.pool, ResourceKind::Group, content.group_id).await?;
    ensure_published(&state.pool, ResourceKind::Member, content.member_id).await
}

/// GET /api/wiki/songs
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<WikiListParams>,
) -> AppResult<Json<DataResponse<Vec<Song>>>> {
    let (limit, offset) = params.clamped();
    let rows =
        SongRepo::list(&state.pool, params.language, params.q.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse::new(rows)))
}

/// GET /api/wiki/songs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Song>>> {
    let song = SongRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Song",
            id,
        })?;
    Ok(Json(DataResponse::new(song)))
}

/// POST /api/wiki/songs/drafts
pub async fn create_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateSongDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftSong>>)> {
    authorize(&user.role, WikiAction::CreateDraft)?;
    validate(&input.content)?;
    check_references(&state, &input.content).await?;

    let tsi = draft_translation_set(
        &state.pool,
        ResourceKind::Song,
        input.translation_set_identifier,
        input.language,
    )
    .await?;
    let draft = SongRepo::create_draft(
        &state.pool,
        tsi,
        input.language,
        user.identity_id,
        &input.content,
    )
    .await?;

    tracing::info!(
        kind = ResourceKind::Song.as_str(),
        draft_id = %draft.id,
        identity_id = %user.identity_id,
        "Draft created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(draft))))
}

/// GET /api/wiki/songs/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<DraftListParams>,
) -> AppResult<Json<DataResponse<Vec<DraftSong>>>> {
    let status = parse_status_filter(params.status.as_deref())?;
    let (limit, offset) = params.clamped();
    let drafts = SongRepo::list_drafts(&state.pool, status, limit, offset).await?;
    Ok(Json(DataResponse::new(drafts)))
}

/// GET /api/wiki/songs/drafts/{id}
pub async fn get_draft(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<DraftSong>>> {
    let draft = find_draft(&state, id).await?;
    Ok(Json(DataResponse::new(draft)))
}

/// PUT /api/wiki/songs/drafts/{id}
///
/// Replaces the content. A rejected draft goes back to pending.
pub async fn update_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<SongContent>,
) -> AppResult<Json<DataResponse<DraftSong>>> {
    let draft = find_draft(&state, id).await?;
    ensure_may_edit(&user, draft.editor_id)?;
    validate(&input)?;
    check_references(&state, &input).await?;

    let current = ApprovalStatus::from_id(draft.status_id)?;
    let next = wiki::status_after_edit(current)?;
    let updated = SongRepo::update_draft(&state.pool, id, current.id(), next.id(), &input)
        .await?
        .ok_or_else(|| concurrently_changed(ResourceKind::Song, id))?;

    tracing::info!(
        kind = ResourceKind::Song.as_str(),
        draft_id = %id,
        identity_id = %user.identity_id,
        "Draft edited"
    );
    Ok(Json(DataResponse::new(updated)))
}

async fn find_draft(state: &AppState, id: EntityId) -> AppResult<DraftSong> {
    SongRepo::find_draft(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: ResourceKind::Song.draft_entity_name(),
                id,
            }
            .into()
        })
}
