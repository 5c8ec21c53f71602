//! Handlers for `/accounts` and account membership.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::account::{
    ensure_owner_remains, validate_account_name, validate_account_type, validate_member_role,
};
use kwiki_core::error::CoreError;
use kwiki_core::types::EntityId;
use kwiki_db::models::account::{
    Account, AccountMember, AddAccountMember, CreateAccount, UpdateAccountMemberRole,
};
use kwiki_db::repositories::{AccountRepo, IdentityRepo};
use validator::Validate;

use super::{require_member, require_owner};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/accounts
///
/// The caller becomes the first owner.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateAccount>,
) -> AppResult<(StatusCode, Json<DataResponse<Account>>)> {
    input.validate()?;
    validate_account_name(&input.name)?;
    validate_account_type(&input.account_type)?;

    let account = AccountRepo::create_with_owner(&state.pool, &input, user.identity_id).await?;
    tracing::info!(
        account_id = %account.id,
        account_type = %account.account_type,
        identity_id = %user.identity_id,
        "Account created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(account))))
}

/// GET /api/accounts
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Account>>>> {
    let accounts = AccountRepo::list_for_identity(&state.pool, user.identity_id).await?;
    Ok(Json(DataResponse::new(accounts)))
}

/// GET /api/accounts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Account>>> {
    let account = require_member(&state.pool, id, user.identity_id).await?;
    Ok(Json(DataResponse::new(account)))
}

/// GET /api/accounts/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<AccountMember>>>> {
    require_member(&state.pool, id, user.identity_id).await?;
    let members = AccountRepo::list_members(&state.pool, id).await?;
    Ok(Json(DataResponse::new(members)))
}

/// POST /api/accounts/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<AddAccountMember>,
) -> AppResult<(StatusCode, Json<DataResponse<AccountMember>>)> {
    require_owner(&state.pool, id, user.identity_id).await?;
    validate_member_role(&input.role)?;
    if IdentityRepo::find_by_id(&state.pool, input.identity_id)
        .await?
        .is_none()
    {
        return Err(CoreError::NotFound {
            entity: "Identity",
            id: input.identity_id,
        }
        .into());
    }

    let member = AccountRepo::add_member(&state.pool, id, input.identity_id, &input.role).await?;
    tracing::info!(
        account_id = %id,
        member_id = %input.identity_id,
        role = %member.role,
        identity_id = %user.identity_id,
        "Account member added"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(member))))
}

/// PUT /api/accounts/{id}/members/{identity_id}
///
/// Demoting the last owner is refused.
pub async fn update_member_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, member_identity_id)): Path<(EntityId, EntityId)>,
    Json(input): Json<UpdateAccountMemberRole>,
) -> AppResult<Json<DataResponse<AccountMember>>> {
    require_owner(&state.pool, id, user.identity_id).await?;
    validate_member_role(&input.role)?;

    let current = find_member(&state, id, member_identity_id).await?;
    let owners = AccountRepo::count_owners(&state.pool, id).await?;
    ensure_owner_remains(owners, &current.role, Some(input.role.as_str()))?;

    let member = AccountRepo::update_member_role(&state.pool, id, member_identity_id, &input.role)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "AccountMember",
            id: member_identity_id,
        })?;
    tracing::info!(
        account_id = %id,
        member_id = %member_identity_id,
        role = %member.role,
        identity_id = %user.identity_id,
        "Account member role changed"
    );
    Ok(Json(DataResponse::new(member)))
}

/// DELETE /api/accounts/{id}/members/{identity_id}
///
/// Removing the last owner is refused.
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, member_identity_id)): Path<(EntityId, EntityId)>,
) -> AppResult<StatusCode> {
    require_owner(&state.pool, id, user.identity_id).await?;

    let current = find_member(&state, id, member_identity_id).await?;
    let owners = AccountRepo::count_owners(&state.pool, id).await?;
    ensure_owner_remains(owners, &current.role, None)?;

    AccountRepo::remove_member(&state.pool, id, member_identity_id).await?;
    tracing::info!(
        account_id = %id,
        member_id = %member_identity_id,
        identity_id = %user.identity_id,
        "Account member removed"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn find_member(
    state: &AppState,
    account_id: EntityId,
    identity_id: EntityId,
) -> AppResult<AccountMember> {
    AccountRepo::find_member(&state.pool, account_id, identity_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "AccountMember",
                id: identity_id,
            }
            .into()
        })
}
