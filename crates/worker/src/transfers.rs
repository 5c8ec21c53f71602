//! Transfer execution with retry.

use kwiki_core::settlement::RetryPolicy;
use kwiki_payments::{GatewayError, GatewayTransfer, PaymentGateway, TransferRequest};

/// Result of executing one transfer, including how many calls were made.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub attempts: u32,
    pub result: Result<GatewayTransfer, GatewayError>,
}

/// Send a transfer, retrying failures according to `policy`.
///
/// Only errors the gateway reports as retryable are retried. The same
/// idempotency key is used for every attempt so a request that
/// reached the provider before timing out is not paid twice.
pub async fn execute_with_retry(
    gateway: &dyn PaymentGateway,
    request: &TransferRequest,
    policy: RetryPolicy,
) -> ExecutionOutcome {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match gateway.transfer(request).await {
            Ok(transfer) => {
                return ExecutionOutcome {
                    attempts,
                    result: Ok(transfer),
                }
            }
            Err(e) if e.is_retryable() && policy.should_retry(attempts) => {
                tracing::warn!(
                    attempt = attempts,
                    destination = %request.destination,
                    error = %e,
                    "Transfer attempt failed, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => {
                tracing::error!(
                    attempts,
                    destination = %request.destination,
                    error = %e,
                    "Transfer failed"
                );
                return ExecutionOutcome {
                    attempts,
                    result: Err(e),
                };
            }
        }
    }
}
