//! Handlers for agency/talent affiliations.
//!
//! Either side may request. Only an owner of the other side may approve or
//! reject, and either side may terminate an active affiliation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::affiliation::{self, Side};
use kwiki_core::error::CoreError;
use kwiki_core::status::AffiliationStatus;
use kwiki_core::types::EntityId;
use kwiki_db::models::affiliation::{Affiliation, RequestAffiliation};
use kwiki_db::repositories::{AccountRepo, AffiliationRepo};
use kwiki_events::{event_types, PlatformEvent};
use sqlx::PgPool;

use super::{find_account, require_member};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Sides of `affiliation` the caller owns, agency first.
async fn owned_sides(
    pool: &PgPool,
    agency_account_id: EntityId,
    talent_account_id: EntityId,
    identity_id: EntityId,
) -> AppResult<Vec<Side>> {
    let mut sides = Vec::with_capacity(2);
    if AccountRepo::is_owner(pool, agency_account_id, identity_id).await? {
        sides.push(Side::Agency);
    }
    if AccountRepo::is_owner(pool, talent_account_id, identity_id).await? {
        sides.push(Side::Talent);
    }
    if sides.is_empty() {
        return Err(CoreError::Forbidden(
            "Only owners of the affiliated accounts may do this".into(),
        )
        .into());
    }
    Ok(sides)
}

fn requested_by(affiliation: &Affiliation) -> AppResult<Side> {
    Side::from_str_opt(&affiliation.requested_by).ok_or_else(|| {
        AppError::InternalError(format!(
            "Affiliation {} has invalid requested_by '{}'",
            affiliation.id, affiliation.requested_by
        ))
    })
}

async fn find(pool: &PgPool, id: EntityId) -> AppResult<Affiliation> {
    AffiliationRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "Affiliation",
            id,
        }
        .into()
    })
}

fn emit(state: &AppState, event_type: &str, affiliation: &Affiliation, actor: &AuthUser) {
    state.event_bus.publish(
        PlatformEvent::new(event_type)
            .with_source("affiliation", affiliation.id)
            .with_actor(actor.identity_id)
            .with_payload(serde_json::json!({
                "agency_account_id": affiliation.agency_account_id,
                "talent_account_id": affiliation.talent_account_id,
            })),
    );
}

/// POST /api/accounts/affiliations
pub async fn request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<RequestAffiliation>,
) -> AppResult<(StatusCode, Json<DataResponse<Affiliation>>)> {
    let agency = find_account(&state.pool, input.agency_account_id).await?;
    let talent = find_account(&state.pool, input.talent_account_id).await?;
    affiliation::validate_parties(&agency.account_type, &talent.account_type)?;

    let sides = owned_sides(&state.pool, agency.id, talent.id, user.identity_id).await?;
    let side = sides[0];

    let existing = AffiliationRepo::statuses_for_pair(&state.pool, agency.id, talent.id)
        .await?
        .into_iter()
        .map(AffiliationStatus::from_id)
        .collect::<Result<Vec<_>, CoreError>>()?;
    affiliation::ensure_no_open_affiliation(existing)?;

    let created = AffiliationRepo::create(
        &state.pool,
        agency.id,
        talent.id,
        side.as_str(),
        input.agency_share_percent,
    )
    .await?;

    tracing::info!(
        affiliation_id = %created.id,
        requested_by = side.as_str(),
        identity_id = %user.identity_id,
        "Affiliation requested"
    );
    emit(&state, event_types::AFFILIATION_REQUESTED, &created, &user);
    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// GET /api/accounts/{id}/affiliations
pub async fn list_for_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<Affiliation>>>> {
    require_member(&state.pool, account_id, user.identity_id).await?;
    let affiliations = AffiliationRepo::list_for_account(&state.pool, account_id).await?;
    Ok(Json(DataResponse::new(affiliations)))
}

/// GET /api/accounts/affiliations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Affiliation>>> {
    let found = find(&state.pool, id).await?;
    let agency_member = AccountRepo::find_member(&state.pool, found.agency_account_id, user.identity_id)
        .await?
        .is_some();
    let talent_member = AccountRepo::find_member(&state.pool, found.talent_account_id, user.identity_id)
        .await?
        .is_some();
    if !agency_member && !talent_member {
        return Err(CoreError::Forbidden("Not a member of either affiliated account".into()).into());
    }
    Ok(Json(DataResponse::new(found)))
}

/// Which side the caller answers for. An identity owning both sides answers
/// as the counter-party of the request.
async fn answering_side(
    state: &AppState,
    found: &Affiliation,
    user: &AuthUser,
) -> AppResult<(Side, Side)> {
    let requested = requested_by(found)?;
    let sides = owned_sides(
        &state.pool,
        found.agency_account_id,
        found.talent_account_id,
        user.identity_id,
    )
    .await?;
    let actor = sides
        .iter()
        .copied()
        .find(|s| *s != requested)
        .unwrap_or(requested);
    Ok((requested, actor))
}

/// POST /api/accounts/affiliations/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Affiliation>>> {
    let found = find(&state.pool, id).await?;
    let (requested, actor) = answering_side(&state, &found, &user).await?;
    let current = AffiliationStatus::from_id(found.status_id)?;
    let next = affiliation::approve(current, requested, actor)?;

    if let Some(active) =
        AffiliationRepo::find_active_for_talent(&state.pool, found.talent_account_id).await?
    {
        return Err(CoreError::Conflict(format!(
            "Talent account already has an active affiliation {}",
            active.id
        ))
        .into());
    }

    let updated = apply(&state, &found, current, next).await?;
    tracing::info!(affiliation_id = %id, identity_id = %user.identity_id, "Affiliation approved");
    emit(&state, event_types::AFFILIATION_APPROVED, &updated, &user);
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/accounts/affiliations/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Affiliation>>> {
    let found = find(&state.pool, id).await?;
    let (requested, actor) = answering_side(&state, &found, &user).await?;
    let current = AffiliationStatus::from_id(found.status_id)?;
    let next = affiliation::reject(current, requested, actor)?;

    let updated = apply(&state, &found, current, next).await?;
    tracing::info!(affiliation_id = %id, identity_id = %user.identity_id, "Affiliation rejected");
    emit(&state, event_types::AFFILIATION_REJECTED, &updated, &user);
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/accounts/affiliations/{id}/terminate
pub async fn terminate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Affiliation>>> {
    let found = find(&state.pool, id).await?;
    owned_sides(
        &state.pool,
        found.agency_account_id,
        found.talent_account_id,
        user.identity_id,
    )
    .await?;
    let current = AffiliationStatus::from_id(found.status_id)?;
    let next = affiliation::terminate(current)?;

    let updated = apply(&state, &found, current, next).await?;
    tracing::info!(affiliation_id = %id, identity_id = %user.identity_id, "Affiliation terminated");
    emit(&state, event_types::AFFILIATION_TERMINATED, &updated, &user);
    Ok(Json(DataResponse::new(updated)))
}

async fn apply(
    state: &AppState,
    found: &Affiliation,
    from: AffiliationStatus,
    to: AffiliationStatus,
) -> AppResult<Affiliation> {
    AffiliationRepo::transition(&state.pool, found.id, from, to)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!(
                "Affiliation {} was changed by another request",
                found.id
            ))
            .into()
        })
}
