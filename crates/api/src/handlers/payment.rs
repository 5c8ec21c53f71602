//! Handlers for payments.
//!
//! Payments are authorized with manual capture. Account members may create
//! and view them; capture, cancel and refund are for account owners.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::identifiers::{new_ulid, validate_ulid};
use kwiki_core::money::{validate_amount, validate_currency};
use kwiki_core::payment;
use kwiki_core::status::PaymentStatus;
use kwiki_core::types::EntityId;
use kwiki_db::models::payment::{
    CreatePayment, CreatePaymentRequest, Payment, RefundPaymentRequest,
};
use kwiki_db::repositories::PaymentRepo;
use kwiki_events::{event_types, PlatformEvent};
use kwiki_payments::{AuthorizeRequest, GatewayError};

use super::{require_member, require_owner};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn find(state: &AppState, id: EntityId) -> AppResult<Payment> {
    PaymentRepo::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "Payment",
            id,
        }
        .into()
    })
}

fn gateway_id(payment: &Payment) -> AppResult<&str> {
    payment.gateway_payment_id.as_deref().ok_or_else(|| {
        AppError::InternalError(format!(
            "Payment {} has no gateway payment id",
            payment.id
        ))
    })
}

fn changed_concurrently(id: EntityId) -> AppError {
    CoreError::Conflict(format!("Payment {id} was changed by another request")).into()
}

fn emit(state: &AppState, event_type: &str, payment: &Payment, actor: &AuthUser) {
    state.event_bus.publish(
        PlatformEvent::new(event_type)
            .with_source("payment", payment.id)
            .with_actor(actor.identity_id)
            .with_payload(serde_json::json!({
                "account_id": payment.account_id,
                "amount": payment.amount,
                "currency": payment.currency,
                "captured_amount": payment.captured_amount,
                "refunded_amount": payment.refunded_amount,
            })),
    );
}

/// POST /api/monetization/payments
///
/// Replaying an idempotency key returns the payment it created.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Payment>>)> {
    require_member(&state.pool, input.account_id, user.identity_id).await?;
    validate_amount(input.amount)?;
    validate_currency(&input.currency)?;
    if input.payment_method_id.trim().is_empty() {
        return Err(CoreError::Validation("payment_method_id is required".into()).into());
    }

    let idempotency_key = match input.idempotency_key {
        Some(key) => {
            validate_ulid(&key)?;
            key
        }
        None => new_ulid(),
    };

    if let Some(existing) =
        PaymentRepo::find_by_idempotency_key(&state.pool, &idempotency_key).await?
    {
        if existing.account_id != input.account_id {
            return Err(CoreError::Conflict(
                "Idempotency key already used by another account".into(),
            )
            .into());
        }
        return Ok((StatusCode::OK, Json(DataResponse::new(existing))));
    }

    let pending = PaymentRepo::create(
        &state.pool,
        &CreatePayment {
            account_id: input.account_id,
            amount: input.amount,
            currency: input.currency.clone(),
            payment_method_id: input.payment_method_id.clone(),
            idempotency_key: idempotency_key.clone(),
        },
    )
    .await?;

    let authorized = state
        .gateway
        .authorize(&AuthorizeRequest {
            amount: input.amount,
            currency: input.currency,
            payment_method_id: input.payment_method_id,
            idempotency_key,
        })
        .await;

    match authorized {
        Ok(gateway_payment) => {
            let stored = PaymentRepo::mark_authorized(&state.pool, pending.id, &gateway_payment.id)
                .await?
                .ok_or_else(|| changed_concurrently(pending.id))?;
            tracing::info!(
                payment_id = %stored.id,
                account_id = %stored.account_id,
                amount = stored.amount,
                identity_id = %user.identity_id,
                "Payment authorized"
            );
            emit(&state, event_types::PAYMENT_AUTHORIZED, &stored, &user);
            Ok((StatusCode::CREATED, Json(DataResponse::new(stored))))
        }
        Err(err) => {
            let reason = match &err {
                GatewayError::Declined(reason) => reason.clone(),
                other => other.to_string(),
            };
            if let Some(failed) = PaymentRepo::mark_failed(&state.pool, pending.id, &reason).await? {
                emit(&state, event_types::PAYMENT_FAILED, &failed, &user);
            }
            tracing::warn!(
                payment_id = %pending.id,
                error = %err,
                "Payment authorization failed"
            );
            Err(err.into())
        }
    }
}

/// GET /api/monetization/payments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Payment>>> {
    let found = find(&state, id).await?;
    require_member(&state.pool, found.account_id, user.identity_id).await?;
    Ok(Json(DataResponse::new(found)))
}

/// GET /api/monetization/accounts/{id}/payments
pub async fn list_for_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<EntityId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Payment>>>> {
    require_member(&state.pool, account_id, user.identity_id).await?;
    let (limit, offset) = params.clamped();
    let payments = PaymentRepo::list_for_account(&state.pool, account_id, limit, offset).await?;
    Ok(Json(DataResponse::new(payments)))
}

/// POST /api/monetization/payments/{id}/capture
pub async fn capture(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Payment>>> {
    let found = find(&state, id).await?;
    require_owner(&state.pool, found.account_id, user.identity_id).await?;
    payment::ensure_capturable(PaymentStatus::from_id(found.status_id)?)?;

    state.gateway.capture(gateway_id(&found)?).await?;
    let captured = PaymentRepo::mark_captured(&state.pool, id)
        .await?
        .ok_or_else(|| changed_concurrently(id))?;

    tracing::info!(payment_id = %id, identity_id = %user.identity_id, "Payment captured");
    emit(&state, event_types::PAYMENT_CAPTURED, &captured, &user);
    Ok(Json(DataResponse::new(captured)))
}

/// POST /api/monetization/payments/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Payment>>> {
    let found = find(&state, id).await?;
    require_owner(&state.pool, found.account_id, user.identity_id).await?;
    payment::ensure_cancellable(PaymentStatus::from_id(found.status_id)?)?;

    state.gateway.cancel(gateway_id(&found)?).await?;
    let cancelled = PaymentRepo::mark_cancelled(&state.pool, id)
        .await?
        .ok_or_else(|| changed_concurrently(id))?;

    tracing::info!(payment_id = %id, identity_id = %user.identity_id, "Payment cancelled");
    emit(&state, event_types::PAYMENT_FAILED, &cancelled, &user);
    Ok(Json(DataResponse::new(cancelled)))
}

/// POST /api/monetization/payments/{id}/refund
///
/// An empty body refunds the full captured amount.
pub async fn refund(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    input: Option<Json<RefundPaymentRequest>>,
) -> AppResult<Json<DataResponse<Payment>>> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let found = find(&state, id).await?;
    require_owner(&state.pool, found.account_id, user.identity_id).await?;
    let amount = payment::refund_amount(
        PaymentStatus::from_id(found.status_id)?,
        found.settlement_batch_id.is_some(),
        found.captured_amount,
        input.amount,
    )?;

    state
        .gateway
        .refund(gateway_id(&found)?, amount, &new_ulid())
        .await?;
    let refunded = PaymentRepo::mark_refunded(&state.pool, id, amount)
        .await?
        .ok_or_else(|| changed_concurrently(id))?;

    tracing::info!(
        payment_id = %id,
        amount,
        identity_id = %user.identity_id,
        "Payment refunded"
    );
    emit(&state, event_types::PAYMENT_REFUNDED, &refunded, &user);
    Ok(Json(DataResponse::new(refunded)))
}
