//! Repository for settlement accounts, batches and transfers.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::status::{PaymentStatus, SettlementBatchStatus, TransferStatus};
use kwiki_core::types::{Date, EntityId};

use crate::models::settlement::{
    CreateSettlementAccount, DueTransfer, NewTransfer, SettlementAccount, SettlementBatch,
    Transfer,
};

const ACCOUNT_COLUMNS: &str = "id, account_id, gateway_account_id, currency, created_at, updated_at";

const BATCH_COLUMNS: &str = "id, account_id, currency, period_start, period_end, gross_amount, \
                             fee_amount, net_amount, status_id, created_at, updated_at";

const TRANSFER_COLUMNS: &str = "id, settlement_batch_id, settlement_account_id, amount, currency, \
                                due_on, status_id, gateway_transfer_id, attempts, last_error, \
                                sent_at, created_at, updated_at";

/// Values of a batch about to be closed.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub account_id: EntityId,
    pub currency: String,
    pub period_start: Date,
    pub period_end: Date,
    pub gross_amount: i64,
    pub fee_amount: i64,
    pub net_amount: i64,
    pub due_on: Date,
}

/// Provides settlement account and batch persistence.
pub struct SettlementRepo;

impl SettlementRepo {
    pub async fn create_account(
        pool: &PgPool,
        input: &CreateSettlementAccount,
    ) -> Result<SettlementAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO settlement_accounts (id, account_id, gateway_account_id, currency)
             VALUES ($1, $2, $3, $4)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, SettlementAccount>(&query)
            .bind(new_id())
            .bind(input.account_id)
            .bind(&input.gateway_account_id)
            .bind(&input.currency)
            .fetch_one(pool)
            .await
    }

    pub async fn find_account_by_account_id(
        pool: &PgPool,
        account_id: EntityId,
    ) -> Result<Option<SettlementAccount>, sqlx::Error> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM settlement_accounts WHERE account_id = $1");
        sqlx::query_as::<_, SettlementAccount>(&query)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Close a batch: insert it, attach the payments, and create its transfers,
    /// all in one transaction.
    ///
    /// Returns `None`, and writes nothing, when any of the payments was claimed
    /// by another batch in the meantime. A batch whose transfers are all zero
    /// has nothing to pay out and is created `Paid`.
    pub async fn create_batch(
        pool: &PgPool,
        batch: &NewBatch,
        payment_ids: &[EntityId],
        transfers: &[NewTransfer],
    ) -> Result<Option<(SettlementBatch, Vec<Transfer>)>, sqlx::Error> {
        let status = if transfers.iter().any(|t| t.amount > 0) {
            SettlementBatchStatus::Closed
        } else {
            SettlementBatchStatus::Paid
        };
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO settlement_batches
                (id, account_id, currency, period_start, period_end,
                 gross_amount, fee_amount, net_amount, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {BATCH_COLUMNS}"
        );
        let created = sqlx::query_as::<_, SettlementBatch>(&query)
            .bind(new_id())
            .bind(batch.account_id)
            .bind(&batch.currency)
            .bind(batch.period_start)
            .bind(batch.period_end)
            .bind(batch.gross_amount)
            .bind(batch.fee_amount)
            .bind(batch.net_amount)
            .bind(status.id())
            .fetch_one(&mut *tx)
            .await?;

        // Row locks make a concurrent claim wait here and then match nothing.
        let claimed = sqlx::query(
            "UPDATE payments SET settlement_batch_id = $1
             WHERE id = ANY($2) AND status_id IN ($3, $4) AND settlement_batch_id IS NULL",
        )
        .bind(created.id)
        .bind(payment_ids)
        .bind(PaymentStatus::Captured.id())
        .bind(PaymentStatus::Refunded.id())
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() != payment_ids.len() as u64 {
            tx.rollback().await?;
            return Ok(None);
        }

        let insert = format!(
            "INSERT INTO transfers
                (id, settlement_batch_id, settlement_account_id, amount, currency, due_on, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TRANSFER_COLUMNS}"
        );
        let mut rows = Vec::with_capacity(transfers.len());
        for transfer in transfers.iter().filter(|t| t.amount > 0) {
            let row = sqlx::query_as::<_, Transfer>(&insert)
                .bind(new_id())
                .bind(created.id)
                .bind(transfer.settlement_account_id)
                .bind(transfer.amount)
                .bind(&batch.currency)
                .bind(batch.due_on)
                .bind(TransferStatus::Pending.id())
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(Some((created, rows)))
    }

    pub async fn find_batch(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<SettlementBatch>, sqlx::Error> {
        let query = format!("SELECT {BATCH_COLUMNS} FROM settlement_batches WHERE id = $1");
        sqlx::query_as::<_, SettlementBatch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_batches(
        pool: &PgPool,
        account_id: EntityId,
    ) -> Result<Vec<SettlementBatch>, sqlx::Error> {
        let query = format!(
            "SELECT {BATCH_COLUMNS} FROM settlement_batches
             WHERE account_id = $1 ORDER BY period_start DESC"
        );
        sqlx::query_as::<_, SettlementBatch>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_transfers(
        pool: &PgPool,
        batch_id: EntityId,
    ) -> Result<Vec<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers
             WHERE settlement_batch_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(batch_id)
            .fetch_all(pool)
            .await
    }

    /// Mark the batch `Paid` once every transfer is `Sent`.
    ///
    /// Returns `true` if the batch status changed.
    pub async fn mark_batch_paid_if_complete(
        pool: &PgPool,
        batch_id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE settlement_batches SET status_id = $2
             WHERE id = $1 AND status_id <> $2
               AND NOT EXISTS (
                   SELECT 1 FROM transfers WHERE settlement_batch_id = $1 AND status_id <> $3
               )",
        )
        .bind(batch_id)
        .bind(SettlementBatchStatus::Paid.id())
        .bind(TransferStatus::Sent.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides transfer execution bookkeeping.
pub struct TransferRepo;

impl TransferRepo {
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!("SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = $1");
        sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Pending transfers due on or before `date`, oldest due first.
    pub async fn list_due(pool: &PgPool, date: Date) -> Result<Vec<DueTransfer>, sqlx::Error> {
        sqlx::query_as::<_, DueTransfer>(
            "SELECT t.id, t.settlement_batch_id, t.amount, t.currency, t.due_on, t.attempts,
                    sa.gateway_account_id
             FROM transfers t
             JOIN settlement_accounts sa ON sa.id = t.settlement_account_id
             WHERE t.status_id = $1 AND t.due_on <= $2
             ORDER BY t.due_on, t.created_at",
        )
        .bind(TransferStatus::Pending.id())
        .bind(date)
        .fetch_all(pool)
        .await
    }

    /// `Pending → Sent`.
    pub async fn mark_sent(
        pool: &PgPool,
        id: EntityId,
        gateway_transfer_id: &str,
        attempts: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transfers SET
                status_id = $3, gateway_transfer_id = $4, attempts = $5,
                last_error = NULL, sent_at = NOW()
             WHERE id = $1 AND status_id = $2",
        )
        .bind(id)
        .bind(TransferStatus::Pending.id())
        .bind(TransferStatus::Sent.id())
        .bind(gateway_transfer_id)
        .bind(attempts)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `Pending → Failed` after the retry budget is spent.
    pub async fn mark_failed(
        pool: &PgPool,
        id: EntityId,
        error: &str,
        attempts: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transfers SET status_id = $3, last_error = $4, attempts = $5
             WHERE id = $1 AND status_id = $2",
        )
        .bind(id)
        .bind(TransferStatus::Pending.id())
        .bind(TransferStatus::Failed.id())
        .bind(error)
        .bind(attempts)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
