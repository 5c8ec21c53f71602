//! Handlers for settlement accounts and batches.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::money::{validate_currency, Percentage};
use kwiki_core::roles::ROLE_ADMINISTRATOR;
use kwiki_core::settlement;
use kwiki_core::types::EntityId;
use kwiki_db::models::settlement::{
    CreateSettlementAccount, CreateSettlementBatch, NewTransfer, SettlementAccount,
    SettlementBatch, SettlementBatchWithTransfers,
};
use kwiki_db::repositories::settlement_repo::NewBatch;
use kwiki_db::repositories::{AccountRepo, AffiliationRepo, PaymentRepo, SettlementRepo};
use kwiki_events::{event_types, PlatformEvent};

use super::{find_account, require_owner};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Administrators see every account's settlements; others must be members.
async fn ensure_can_view(state: &AppState, account_id: EntityId, user: &AuthUser) -> AppResult<()> {
    find_account(&state.pool, account_id).await?;
    if user.role == ROLE_ADMINISTRATOR {
        return Ok(());
    }
    if AccountRepo::find_member(&state.pool, account_id, user.identity_id)
        .await?
        .is_none()
    {
        return Err(CoreError::Forbidden("Not a member of this account".into()).into());
    }
    Ok(())
}

async fn settlement_account_of(state: &AppState, account_id: EntityId) -> AppResult<SettlementAccount> {
    SettlementRepo::find_account_by_account_id(&state.pool, account_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "SettlementAccount",
                id: account_id,
            }
            .into()
        })
}

/// POST /api/monetization/settlement-accounts
pub async fn create_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateSettlementAccount>,
) -> AppResult<(StatusCode, Json<DataResponse<SettlementAccount>>)> {
    require_owner(&state.pool, input.account_id, user.identity_id).await?;
    validate_currency(&input.currency)?;
    if input.gateway_account_id.trim().is_empty() {
        return Err(CoreError::Validation("gateway_account_id is required".into()).into());
    }

    let created = SettlementRepo::create_account(&state.pool, &input).await?;
    tracing::info!(
        settlement_account_id = %created.id,
        account_id = %created.account_id,
        identity_id = %user.identity_id,
        "Settlement account created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// GET /api/monetization/accounts/{id}/settlement-account
pub async fn get_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<SettlementAccount>>> {
    ensure_can_view(&state, account_id, &user).await?;
    let found = settlement_account_of(&state, account_id).await?;
    Ok(Json(DataResponse::new(found)))
}

/// POST /api/monetization/settlements/batches
///
/// Closes the account's captured, unsettled payments of the period. When the
/// account is the talent side of an active affiliation, the agency's share
/// becomes a separate transfer to the agency's settlement account.
pub async fn create_batch(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateSettlementBatch>,
) -> AppResult<(StatusCode, Json<DataResponse<SettlementBatchWithTransfers>>)> {
    settlement::validate_period(input.period_start, input.period_end)?;
    find_account(&state.pool, input.account_id).await?;
    let payee = settlement_account_of(&state, input.account_id).await?;

    let payments = PaymentRepo::list_unsettled(
        &state.pool,
        input.account_id,
        &payee.currency,
        input.period_start,
        input.period_end,
    )
    .await?;
    let amounts: Vec<i64> = payments.iter().map(|p| p.settleable_amount()).collect();
    let payment_ids: Vec<EntityId> = payments.iter().map(|p| p.id).collect();

    let agency = match AffiliationRepo::find_active_for_talent(&state.pool, input.account_id).await? {
        Some(affiliation) => {
            let share = Percentage::new(affiliation.agency_share_percent)?;
            let agency_account =
                settlement_account_of(&state, affiliation.agency_account_id).await?;
            if agency_account.currency != payee.currency {
                return Err(CoreError::Validation(format!(
                    "Agency settlement currency '{}' differs from '{}'",
                    agency_account.currency, payee.currency
                ))
                .into());
            }
            Some((share, agency_account))
        }
        None => None,
    };

    let breakdown = settlement::compute_breakdown(
        &amounts,
        state.config.platform_fee,
        agency.as_ref().map(|(share, _)| *share),
    )?;

    let mut transfers = vec![NewTransfer {
        settlement_account_id: payee.id,
        amount: breakdown.account_amount,
    }];
    if let Some((_, agency_account)) = &agency {
        transfers.push(NewTransfer {
            settlement_account_id: agency_account.id,
            amount: breakdown.agency_amount,
        });
    }

    let (batch, transfers) = SettlementRepo::create_batch(
        &state.pool,
        &NewBatch {
            account_id: input.account_id,
            currency: payee.currency.clone(),
            period_start: input.period_start,
            period_end: input.period_end,
            gross_amount: breakdown.gross_amount,
            fee_amount: breakdown.fee_amount,
            net_amount: breakdown.net_amount,
            due_on: settlement::due_date(input.period_end),
        },
        &payment_ids,
        &transfers,
    )
    .await?
    .ok_or_else(|| {
        CoreError::Conflict("Some payments of this period were settled concurrently".into())
    })?;

    tracing::info!(
        batch_id = %batch.id,
        account_id = %batch.account_id,
        gross_amount = batch.gross_amount,
        fee_amount = batch.fee_amount,
        transfers = transfers.len(),
        identity_id = %admin.identity_id,
        "Settlement batch closed"
    );
    state.event_bus.publish(
        PlatformEvent::new(event_types::SETTLEMENT_BATCH_CLOSED)
            .with_source("settlement_batch", batch.id)
            .with_actor(admin.identity_id)
            .with_payload(serde_json::json!({
                "account_id": batch.account_id,
                "net_amount": batch.net_amount,
                "currency": batch.currency,
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(SettlementBatchWithTransfers { batch, transfers })),
    ))
}

/// GET /api/monetization/accounts/{id}/settlements/batches
pub async fn list_batches(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<SettlementBatch>>>> {
    ensure_can_view(&state, account_id, &user).await?;
    let batches = SettlementRepo::list_batches(&state.pool, account_id).await?;
    Ok(Json(DataResponse::new(batches)))
}

/// GET /api/monetization/settlements/batches/{id}
pub async fn get_batch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<SettlementBatchWithTransfers>>> {
    let batch = SettlementRepo::find_batch(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "SettlementBatch",
            id,
        })?;
    ensure_can_view(&state, batch.account_id, &user).await?;
    let transfers = SettlementRepo::list_transfers(&state.pool, id).await?;
    Ok(Json(DataResponse::new(SettlementBatchWithTransfers { batch, transfers })))
}
