//! Repository for the `payments` table.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::status::PaymentStatus;
use kwiki_core::types::{Date, EntityId};

use crate::models::payment::{CreatePayment, Payment};

const COLUMNS: &str = "id, account_id, amount, currency, payment_method_id, idempotency_key, \
                       gateway_payment_id, status_id, captured_amount, refunded_amount, \
                       failure_reason, captured_at, settlement_batch_id, created_at, updated_at";

/// Provides CRUD operations and status transitions for payments.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a pending payment before it is sent to the gateway.
    pub async fn create(pool: &PgPool, input: &CreatePayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments
                (id, account_id, amount, currency, payment_method_id, idempotency_key, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(new_id())
            .bind(input.account_id)
            .bind(input.amount)
            .bind(&input.currency)
            .bind(&input.payment_method_id)
            .bind(&input.idempotency_key)
            .bind(PaymentStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_idempotency_key(
        pool: &PgPool,
        key: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE idempotency_key = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_account(
        pool: &PgPool,
        account_id: EntityId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE account_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(account_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// `Pending → Authorized` with the gateway's payment id.
    pub async fn mark_authorized(
        pool: &PgPool,
        id: EntityId,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status_id = $3, gateway_payment_id = $4
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Pending.id())
            .bind(PaymentStatus::Authorized.id())
            .bind(gateway_payment_id)
            .fetch_optional(pool)
            .await
    }

    /// `Pending → Failed` with the decline reason.
    pub async fn mark_failed(
        pool: &PgPool,
        id: EntityId,
        reason: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status_id = $3, failure_reason = $4
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Pending.id())
            .bind(PaymentStatus::Failed.id())
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// `Authorized → Captured` for the full authorized amount.
    pub async fn mark_captured(pool: &PgPool, id: EntityId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status_id = $3, captured_amount = amount, captured_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Authorized.id())
            .bind(PaymentStatus::Captured.id())
            .fetch_optional(pool)
            .await
    }

    /// `Authorized → Failed` after the authorization was released at the gateway.
    pub async fn mark_cancelled(pool: &PgPool, id: EntityId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status_id = $3, failure_reason = 'cancelled'
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Authorized.id())
            .bind(PaymentStatus::Failed.id())
            .fetch_optional(pool)
            .await
    }

    /// `Captured → Refunded`, recording the refunded amount. Payments already
    /// claimed by a settlement batch are left alone.
    pub async fn mark_refunded(
        pool: &PgPool,
        id: EntityId,
        amount: i64,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status_id = $3, refunded_amount = $4
             WHERE id = $1 AND status_id = $2 AND settlement_batch_id IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Captured.id())
            .bind(PaymentStatus::Refunded.id())
            .bind(amount)
            .fetch_optional(pool)
            .await
    }

    /// Payments of an account not yet assigned to a batch, captured within
    /// `[period_start, period_end)` in `currency`, that still hold money:
    /// captured ones and partially refunded ones.
    pub async fn list_unsettled(
        pool: &PgPool,
        account_id: EntityId,
        currency: &str,
        period_start: Date,
        period_end: Date,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments
             WHERE account_id = $1
               AND currency = $2
               AND status_id IN ($3, $4)
               AND captured_amount > refunded_amount
               AND settlement_batch_id IS NULL
               AND captured_at >= $5::DATE
               AND captured_at < $6::DATE
             ORDER BY captured_at"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(account_id)
            .bind(currency)
            .bind(PaymentStatus::Captured.id())
            .bind(PaymentStatus::Refunded.id())
            .bind(period_start)
            .bind(period_end)
            .fetch_all(pool)
            .await
    }
}
