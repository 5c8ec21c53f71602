//! Payment state transitions.

use crate::error::CoreError;
use crate::status::PaymentStatus;

fn illegal(action: &str, status: PaymentStatus) -> CoreError {
    CoreError::Conflict(format!("Cannot {action} a payment with status '{status}'"))
}

/// Only authorized payments can be captured.
pub fn ensure_capturable(status: PaymentStatus) -> Result<(), CoreError> {
    match status {
        PaymentStatus::Authorized => Ok(()),
        other => Err(illegal("capture", other)),
    }
}

/// Only authorized payments can be cancelled.
pub fn ensure_cancellable(status: PaymentStatus) -> Result<(), CoreError> {
    match status {
        PaymentStatus::Authorized => Ok(()),
        other => Err(illegal("cancel", other)),
    }
}

/// Only captured payments not yet in a settlement batch can be refunded, for
/// at most the captured amount.
///
/// Returns the amount to refund (`None` means the full captured amount).
pub fn refund_amount(
    status: PaymentStatus,
    settled: bool,
    captured_amount: i64,
    requested: Option<i64>,
) -> Result<i64, CoreError> {
    if status != PaymentStatus::Captured {
        return Err(illegal("refund", status));
    }
    if settled {
        return Err(CoreError::Conflict(
            "Cannot refund a payment that is already in a settlement batch".into(),
        ));
    }
    let amount = requested.unwrap_or(captured_amount);
    if amount <= 0 || amount > captured_amount {
        return Err(CoreError::Validation(format!(
            "Refund amount must be between 1 and {captured_amount}, got {amount}"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_requires_authorized() {
        assert!(ensure_capturable(PaymentStatus::Authorized).is_ok());
        assert!(ensure_capturable(PaymentStatus::Captured).is_err());
        assert!(ensure_capturable(PaymentStatus::Failed).is_err());
    }

    #[test]
    fn full_refund_by_default() {
        assert_eq!(
            refund_amount(PaymentStatus::Captured, false, 5_000, None).unwrap(),
            5_000
        );
    }

    #[test]
    fn partial_refund_bounded() {
        assert_eq!(
            refund_amount(PaymentStatus::Captured, false, 5_000, Some(1_000)).unwrap(),
            1_000
        );
        assert!(refund_amount(PaymentStatus::Captured, false, 5_000, Some(5_001)).is_err());
        assert!(refund_amount(PaymentStatus::Captured, false, 5_000, Some(0)).is_err());
    }

    #[test]
    fn refund_requires_captured() {
        let err = refund_amount(PaymentStatus::Authorized, false, 5_000, None).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn settled_payment_cannot_be_refunded() {
        let err = refund_amount(PaymentStatus::Captured, true, 5_000, None).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn cancel_requires_authorized() {
        assert!(ensure_cancellable(PaymentStatus::Authorized).is_ok());
        assert!(ensure_cancellable(PaymentStatus::Refunded).is_err());
    }
}
