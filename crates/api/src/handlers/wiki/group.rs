//! Handlers for `/wiki/groups`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::policy::{authorize, WikiAction};
use kwiki_core::status::ApprovalStatus;
use kwiki_core::types::EntityId;
use kwiki_core::wiki::{self, ResourceKind};
use kwiki_db::models::group::{CreateGroupDraft, DraftGroup, Group, GroupContent};
use kwiki_db::repositories::GroupRepo;

use super::{
    concurrently_changed, draft_translation_set, ensure_may_edit, ensure_published,
    parse_status_filter, today,
};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{DraftListParams, WikiListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn validate(content: &GroupContent) -> Result<(), CoreError> {
    wiki::validate_group(
        &content.name,
        content.description.as_deref(),
        content.image_path.as_deref(),
    )
}

async fn check_references(state: &AppState, content: &GroupContent) -> AppResult<()> {
    ensure_published(&state.pool, ResourceKind::Agency, content.agency_id).await
}

/// GET /api/wiki/groups
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<WikiListParams>,
) -> AppResult<Json<DataResponse<Vec<Group>>>> {
    let (limit, offset) = params.clamped();
    let rows =
        GroupRepo::list(&state.pool, params.language, params.q.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse::new(rows)))
}

/// GET /api/wiki/groups/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Group>>> {
    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Group",
            id,
        })?;
    Ok(Json(DataResponse::new(group)))
}

/// POST /api/wiki/groups/drafts
pub async fn create_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateGroupDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftGroup>>)> {
    authorize(&user.role, WikiAction::CreateDraft)?;
    validate(&input.content)?;
    check_references(&state, &input.content).await?;

    let tsi = draft_translation_set(
        &state.pool,
        ResourceKind::Group,
        input.translation_set_identifier,
        input.language,
    )
    .await?;
    let draft = GroupRepo::create_draft(
        &state.pool,
        tsi,
        input.language,
        user.identity_id,
        &input.content,
    )
    .await?;

    tracing::info!(
        kind = ResourceKind::Group.as_str(),
        draft_id = %draft.id,
        identity_id = %user.identity_id,
        "Draft created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(draft))))
}

/// GET /api/wiki/groups/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<DraftListParams>,
) -> AppResult<Json<DataResponse<Vec<DraftGroup>>>> {
    let status = parse_status_filter(params.status.as_deref())?;
    let (limit, offset) = params.clamped();
    let drafts = GroupRepo::list_drafts(&state.pool, status, limit, offset).await?;
    Ok(Json(DataResponse::new(drafts)))
}

/// GET /api/wiki/groups/drafts/{id}
pub async fn get_draft(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<DraftGroup>>> {
    let draft = find_draft(&state, id).await?;
    Ok(Json(DataResponse::new(draft)))
}

/// PUT /api/wiki/groups/drafts/{id}
///
/// Replaces the content. A rejected draft goes back to pending.
pub async fn update_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<GroupContent>,
) -> AppResult<Json<DataResponse<DraftGroup>>> {
    let draft = find_draft(&state, id).await?;
    ensure_may_edit(&user, draft.editor_id)?;
    validate(&input)?;
    check_references(&state, &input).await?;

    let current = ApprovalStatus::from_id(draft.status_id)?;
    let next = wiki::status_after_edit(current)?;
    let updated = GroupRepo::update_draft(&state.pool, id, current.id(), next.id(), &input)
        .await?
        .ok_or_else(|| concurrently_changed(ResourceKind::Group, id))?;

    tracing::info!(
        kind = ResourceKind::Group.as_str(),
        draft_id = %id,
        identity_id = %user.identity_id,
        "Draft edited"
    );
    Ok(Json(DataResponse::new(updated)))
}

async fn find_draft(state: &AppState, id: EntityId) -> AppResult<DraftGroup> {
    GroupRepo::find_draft(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: ResourceKind::Group.draft_entity_name(),
                id,
            }
            .into()
        })
}
