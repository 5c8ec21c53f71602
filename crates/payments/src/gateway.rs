//! Provider-neutral gateway trait and its request/response types.

use async_trait::async_trait;

use crate::error::GatewayError;

/// A manual-capture authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    /// Minor units.
    pub amount: i64,
    /// Lowercase ISO-4217 code.
    pub currency: String,
    pub payment_method_id: String,
    /// Forwarded so a retried request cannot charge twice.
    pub idempotency_key: String,
}

/// Payment state as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPayment {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRefund {
    pub id: String,
    pub amount: i64,
}

/// A payout to a connected account.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub amount: i64,
    pub currency: String,
    /// Connected account id at the provider.
    pub destination: String,
    /// Groups the transfers of one settlement batch.
    pub transfer_group: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTransfer {
    pub id: String,
}

/// Operations the platform needs from a payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorize without capturing. A declined payment method yields
    /// [`GatewayError::Declined`].
    async fn authorize(&self, request: &AuthorizeRequest) -> Result<GatewayPayment, GatewayError>;

    async fn capture(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError>;

    /// Release an authorization that will not be captured.
    async fn cancel(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError>;

    async fn refund(
        &self,
        gateway_payment_id: &str,
        amount: i64,
        idempotency_key: &str,
    ) -> Result<GatewayRefund, GatewayError>;

    async fn transfer(&self, request: &TransferRequest) -> Result<GatewayTransfer, GatewayError>;
}
