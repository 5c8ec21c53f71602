//! Handlers for `/wiki/agencies`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::policy::{authorize, WikiAction};
use kwiki_core::status::ApprovalStatus;
use kwiki_core::types::EntityId;
use kwiki_core::wiki::{self, ResourceKind};
use kwiki_db::models::agency::{Agency, AgencyContent, CreateAgencyDraft, DraftAgency};
use kwiki_db::repositories::AgencyRepo;

use super::{
    concurrently_changed, draft_translation_set, ensure_may_edit, parse_status_filter, today,
};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{DraftListParams, WikiListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn validate(content: &AgencyContent) -> Result<(), CoreError> {
    wiki::validate_agency(
        &content.name,
        content.ceo.as_deref(),
        content.founded_in,
        content.description.as_deref(),
        today(),
    )
}

/// GET /api/wiki/agencies
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<WikiListParams>,
) -> AppResult<Json<DataResponse<Vec<Agency>>>> {
    let (limit, offset) = params.clamped();
    let agencies =
        AgencyRepo::list(&state.pool, params.language, params.q.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse::new(agencies)))
}

/// GET /api/wiki/agencies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Agency>>> {
    let agency = AgencyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Agency",
            id,
        })?;
    Ok(Json(DataResponse::new(agency)))
}

/// POST /api/wiki/agencies/drafts
pub async fn create_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateAgencyDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftAgency>>)> {
    authorize(&user.role, WikiAction::CreateDraft)?;
    validate(&input.content)?;

    let tsi = draft_translation_set(
        &state.pool,
        ResourceKind::Agency,
        input.translation_set_identifier,
        input.language,
    )
    .await?;
    let draft = AgencyRepo::create_draft(
        &state.pool,
        tsi,
        input.language,
        user.identity_id,
        &input.content,
    )
    .await?;

    tracing::info!(
        kind = ResourceKind::Agency.as_str(),
        draft_id = %draft.id,
        identity_id = %user.identity_id,
        "Draft created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(draft))))
}

/// GET /api/wiki/agencies/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<DraftListParams>,
) -> AppResult<Json<DataResponse<Vec<DraftAgency>>>> {
    let status = parse_status_filter(params.status.as_deref())?;
    let (limit, offset) = params.clamped();
    let drafts = AgencyRepo::list_drafts(&state.pool, status, limit, offset).await?;
    Ok(Json(DataResponse::new(drafts)))
}

/// GET /api/wiki/agencies/drafts/{id}
pub async fn get_draft(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<DraftAgency>>> {
    let draft = find_draft(&state, id).await?;
    Ok(Json(DataResponse::new(draft)))
}

/// PUT /api/wiki/agencies/drafts/{id}
///
/// Replaces the content. A rejected draft goes back to pending.
pub async fn update_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<AgencyContent>,
) -> AppResult<Json<DataResponse<DraftAgency>>> {
    let draft = find_draft(&state, id).await?;
    ensure_may_edit(&user, draft.editor_id)?;
    validate(&input)?;

    let current = ApprovalStatus::from_id(draft.status_id)?;
    let next = wiki::status_after_edit(current)?;
    let updated = AgencyRepo::update_draft(&state.pool, id, current.id(), next.id(), &input)
        .await?
        .ok_or_else(|| concurrently_changed(ResourceKind::Agency, id))?;

    tracing::info!(
        kind = ResourceKind::Agency.as_str(),
        draft_id = %id,
        identity_id = %user.identity_id,
        "Draft edited"
    );
    Ok(Json(DataResponse::new(updated)))
}

async fn find_draft(state: &AppState, id: EntityId) -> AppResult<DraftAgency> {
    AgencyRepo::find_draft(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: ResourceKind::Agency.draft_entity_name(),
                id,
            }
            .into()
        })
}
