//! Settlement account, batch and transfer models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::status::StatusId;
use kwiki_core::types::{Date, EntityId, Timestamp};

/// A row from the `settlement_accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SettlementAccount {
    pub id: EntityId,
    pub account_id: EntityId,
    pub gateway_account_id: String,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateSettlementAccount {
    pub account_id: EntityId,
    pub gateway_account_id: String,
    pub currency: String,
}

/// A row from the `settlement_batches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SettlementBatch {
    pub id: EntityId,
    pub account_id: EntityId,
    pub currency: String,
    pub period_start: Date,
    pub period_end: Date,
    pub gross_amount: i64,
    pub fee_amount: i64,
    pub net_amount: i64,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for closing a settlement period into a batch.
#[derive(Debug, Deserialize)]
pub struct CreateSettlementBatch {
    pub account_id: EntityId,
    pub period_start: Date,
    pub period_end: Date,
}

/// A row from the `transfers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transfer {
    pub id: EntityId,
    pub settlement_batch_id: EntityId,
    pub settlement_account_id: EntityId,
    pub amount: i64,
    pub currency: String,
    pub due_on: Date,
    pub status_id: StatusId,
    pub gateway_transfer_id: Option<String>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A pending transfer joined with the destination gateway account.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DueTransfer {
    pub id: EntityId,
    pub settlement_batch_id: EntityId,
    pub amount: i64,
    pub currency: String,
    pub due_on: Date,
    pub attempts: i32,
    pub gateway_account_id: String,
}

/// DTO for one transfer line of a new batch.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub settlement_account_id: EntityId,
    pub amount: i64,
}

/// A batch together with the transfers it produced.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementBatchWithTransfers {
    #[serde(flatten)]
    pub batch: SettlementBatch,
    pub transfers: Vec<Transfer>,
}
