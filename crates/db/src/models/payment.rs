//! Payment models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::status::StatusId;
use kwiki_core::types::{EntityId, Timestamp};

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: EntityId,
    pub account_id: EntityId,
    pub amount: i64,
    pub currency: String,
    pub payment_method_id: String,
    pub idempotency_key: String,
    pub gateway_payment_id: Option<String>,
    pub status_id: StatusId,
    pub captured_amount: i64,
    pub refunded_amount: i64,
    pub failure_reason: Option<String>,
    pub captured_at: Option<Timestamp>,
    pub settlement_batch_id: Option<EntityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// What is left to pay out once refunds are taken off.
    pub fn settleable_amount(&self) -> i64 {
        self.captured_amount - self.refunded_amount
    }
}

/// Request body for creating a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub account_id: EntityId,
    pub amount: i64,
    pub currency: String,
    pub payment_method_id: String,
    /// ULID supplied by the client; generated when absent.
    pub idempotency_key: Option<String>,
}

/// DTO for inserting a payment row before calling the gateway.
#[derive(Debug)]
pub struct CreatePayment {
    pub account_id: EntityId,
    pub amount: i64,
    pub currency: String,
    pub payment_method_id: String,
    pub idempotency_key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefundPaymentRequest {
    /// Partial refund amount; the full captured amount when absent.
    pub amount: Option<i64>,
}
