//! Settlement batch arithmetic and transfer retry policy.

use std::time::Duration;

use crate::error::CoreError;
use crate::money::Percentage;
use crate::types::Date;

/// Days between the end of a settlement period and the payout due date.
pub const PAYOUT_DELAY_DAYS: u64 = 7;

/// Default platform fee when `PLATFORM_FEE_PERCENT` is not configured.
pub const DEFAULT_PLATFORM_FEE_PERCENT: i16 = 10;

/// How a batch's gross amount is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchBreakdown {
    pub gross_amount: i64,
    pub fee_amount: i64,
    pub net_amount: i64,
    /// Portion of `net_amount` owed to an affiliated agency.
    pub agency_amount: i64,
    /// Portion of `net_amount` owed to the account itself.
    pub account_amount: i64,
}

/// Validate a half-open settlement period `[start, end)`.
pub fn validate_period(start: Date, end: Date) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::Validation(format!(
            "Settlement period start {start} must be before end {end}"
        )));
    }
    Ok(())
}

/// Split the captured payment amounts of a period.
///
/// Fee and agency share are each rounded down; any rounding remainder stays
/// with the account.
pub fn compute_breakdown(
    amounts: &[i64],
    platform_fee: Percentage,
    agency_share: Option<Percentage>,
) -> Result<BatchBreakdown, CoreError> {
    if amounts.is_empty() {
        return Err(CoreError::Validation(
            "No captured payments in the settlement period".into(),
        ));
    }
    let gross_amount = amounts
        .iter()
        .try_fold(0i64, |acc, a| acc.checked_add(*a))
        .ok_or_else(|| CoreError::Validation("Settlement amount overflow".into()))?;
    let fee_amount = platform_fee.of(gross_amount);
    let net_amount = gross_amount - fee_amount;
    let agency_amount = agency_share.map(|p| p.of(net_amount)).unwrap_or(0);
    Ok(BatchBreakdown {
        gross_amount,
        fee_amount,
        net_amount,
        agency_amount,
        account_amount: net_amount - agency_amount,
    })
}

/// Payout due date for a period ending on `period_end`.
pub fn due_date(period_end: Date) -> Date {
    period_end + chrono::Days::new(PAYOUT_DELAY_DAYS)
}

/// Retry behaviour for transfer execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_tries: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 3,
            backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempts_made` failures.
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_tries
    }
}
