//! Handlers for `/wiki/members`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::policy::{authorize, WikiAction};
use kwiki_core::status::ApprovalStatus;
use kwiki_core::types::EntityId;
use kwiki_core::wiki::{self, ResourceKind};
use kwiki_db::models::member::{CreateMemberDraft, DraftMember, Member, MemberContent};
use kwiki_db::repositories::MemberRepo;

use super::{
    concurrently_changed, draft_translation_set, ensure_all_published, ensure_may_edit,
    ensure_published, parse_status_filter, today,
};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{DraftListParams, WikiListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn validate(content: &MemberContent) -> Result<(), CoreError> {
    wiki::validate_member(
        &content.name,
        content.real_name.as_deref(),
        content.birthday,
        &content.group_ids,
        content.career.as_deref(),
        content.image_path.as_deref(),
        today(),
    )
}

/// The agency and every listed group must be published.
async fn check_references(state: &AppState, content: &MemberContent) -> AppResult<()> {
    ensure_published(&state.pool, ResourceKind::Agency, content.agency_id).await?;
    ensure_all_published(&state.pool, ResourceKind::Group, &content.group_ids).await
}

/// GET /api/wiki/members
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<WikiListParams>,
) -> AppResult<Json<DataResponse<Vec<Member>>>> {
    let (limit, offset) = params.clamped();
    let rows =
        MemberRepo::list(&state.pool, params.language, params.q.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse::new(rows)))
}

/// GET /api/wiki/members/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Member>>> {
    let member = MemberRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Member",
            id,
        })?;
    Ok(Json(DataResponse::new(member)))
}

/// POST /api/wiki/members/drafts
pub async fn create_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateMemberDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftMember>>)> {
    authorize(&user.role, WikiAction::CreateDraft)?;
    validate(&input.content)?;
    check_references(&state, &input.content).await?;

    let tsi = draft_translation_set(
        &state.pool,
        ResourceKind::Member,
        input.translation_set_identifier,
        input.language,
    )
    .await?;
    let draft = MemberRepo::create_draft(
        &state.pool,
        tsi,
        input.language,
        user.identity_id,
        &input.content,
    )
    .await?;

    tracing::info!(
        kind = ResourceKind::Member.as_str(),
        draft_id = %draft.id,
        identity_id = %user.identity_id,
        "Draft created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(draft))))
}

/// GET /api/wiki/members/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<DraftListParams>,
) -> AppResult<Json<DataResponse<Vec<DraftMember>>>> {
    let status = parse_status_filter(params.status.as_deref())?;
    let (limit, offset) = params.clamped();
    let drafts = MemberRepo::list_drafts(&state.pool, status, limit, offset).await?;
    Ok(Json(DataResponse::new(drafts)))
}

/// GET /api/wiki/members/drafts/{id}
pub async fn get_draft(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<DraftMember>>> {
    let draft = find_draft(&state, id).await?;
    Ok(Json(DataResponse::new(draft)))
}

/// PUT /api/wiki/members/drafts/{id}
///
/// Replaces the content. A rejected draft goes back to pending.
pub async fn update_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<MemberContent>,
) -> AppResult<Json<DataResponse<DraftMember>>> {
    let draft = find_draft(&state, id).await?;
    ensure_may_edit(&user, draft.editor_id)?;
    validate(&input)?;
    check_references(&state, &input).await?;

    let current = ApprovalStatus::from_id(draft.status_id)?;
    let next = wiki::status_after_edit(current)?;
    let updated = MemberRepo::update_draft(&state.pool, id, current.id(), next.id(), &input)
        .await?
        .ok_or_else(|| concurrently_changed(ResourceKind::Member, id))?;

    tracing::info!(
        kind = ResourceKind::Member.as_str(),
        draft_id = %id,
        identity_id = %user.identity_id,
        "Draft edited"
    );
    Ok(Json(DataResponse::new(updated)))
}

async fn find_draft(state: &AppState, id: EntityId) -> AppResult<DraftMember> {
    MemberRepo::find_draft(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: ResourceKind::Member.draft_entity_name(),
                id,
            }
            .into()
        })
}

/// GET /api/wiki/groups/{id}/members
pub async fn list_by_group(
    State(state): State<AppState>,
    Path(group_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<Member>>>> {
    let members = MemberRepo::list_by_group(&state.pool, group_id).await?;
    Ok(Json(DataResponse::new(members)))
}
