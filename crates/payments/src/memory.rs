//! Scriptable in-memory [`PaymentGateway`] for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::gateway::{
    AuthorizeRequest, GatewayPayment, GatewayRefund, GatewayTransfer, PaymentGateway,
    TransferRequest,
};

/// Payment method id that the in-memory gateway always declines.
pub const DECLINED_PAYMENT_METHOD: &str = "pm_card_declined";

/// Records calls and returns canned results.
///
/// Transfers fail while queued failures remain; everything else succeeds
/// unless the payment method is [`DECLINED_PAYMENT_METHOD`].
#[derive(Default)]
pub struct InMemoryGateway {
    sequence: AtomicU64,
    transfer_failures: Mutex<VecDeque<GatewayError>>,
    transfers: Mutex<Vec<TransferRequest>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` transfer calls fail with a retryable error.
    pub fn fail_next_transfers(&self, count: usize) {
        let mut failures = self.transfer_failures.lock().unwrap_or_else(|e| e.into_inner());
        for _ in 0..count {
            failures.push_back(GatewayError::Api {
                status: 503,
                code: None,
                message: "Service unavailable".into(),
            });
        }
    }

    /// Make the next transfer call fail with `error`.
    pub fn fail_next_transfer_with(&self, error: GatewayError) {
        self.transfer_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(error);
    }

    /// Transfers that went through, in call order.
    pub fn sent_transfers(&self) -> Vec<TransferRequest> {
        self.transfers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn authorize(&self, request: &AuthorizeRequest) -> Result<GatewayPayment, GatewayError> {
        if request.payment_method_id == DECLINED_PAYMENT_METHOD {
            return Err(GatewayError::Declined("card_declined".into()));
        }
        Ok(GatewayPayment {
            id: self.next_id("pi"),
            status: "requires_capture".into(),
        })
    }

    async fn capture(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        Ok(GatewayPayment {
            id: gateway_payment_id.to_string(),
            status: "succeeded".into(),
        })
    }

    async fn cancel(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        Ok(GatewayPayment {
            id: gateway_payment_id.to_string(),
            status: "canceled".into(),
        })
    }

    async fn refund(
        &self,
        _gateway_payment_id: &str,
        amount: i64,
        _idempotency_key: &str,
    ) -> Result<GatewayRefund, GatewayError> {
        Ok(GatewayRefund {
            id: self.next_id("re"),
            amount,
        })
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<GatewayTransfer, GatewayError> {
        let failure = self
            .transfer_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(err) = failure {
            return Err(err);
        }
        self.transfers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        Ok(GatewayTransfer {
            id: self.next_id("tr"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> TransferRequest {
        TransferRequest {
            amount: 100,
            currency: "krw".into(),
            destination: "acct_1".into(),
            transfer_group: "batch".into(),
            idempotency_key: "k".into(),
        }
    }

    #[tokio::test]
    async fn queued_failures_are_consumed_in_order() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next_transfers(1);

        assert!(gateway.transfer(&transfer()).await.is_err());
        assert!(gateway.transfer(&transfer()).await.is_ok());
        assert_eq!(gateway.sent_transfers().len(), 1);
    }

    #[tokio::test]
    async fn declined_method_is_refused() {
        let gateway = InMemoryGateway::new();
        let request = AuthorizeRequest {
            amount: 1,
            currency: "usd".into(),
            payment_method_id: DECLINED_PAYMENT_METHOD.into(),
            idempotency_key: "k".into(),
        };
        assert!(matches!(
            gateway.authorize(&request).await,
            Err(GatewayError::Declined(_))
        ));
    }
}
