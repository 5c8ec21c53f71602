//! Due-transfer processing.

use std::sync::Arc;

use sqlx::PgPool;
use kwiki_core::settlement::RetryPolicy;
use kwiki_core::types::{Date, EntityId};
use kwiki_db::models::settlement::DueTransfer;
use kwiki_db::repositories::{SettlementRepo, TransferRepo};
use kwiki_payments::{PaymentGateway, TransferRequest};

use crate::transfers::execute_with_retry;

/// What happened to one due transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub transfer_id: EntityId,
    pub amount: i64,
    pub currency: String,
    pub destination: String,
    /// `None` in dry-run mode.
    pub outcome: Option<Result<String, String>>,
}

/// Totals for one processing run.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub date: Option<Date>,
    pub dry_run: bool,
    pub transfers: Vec<TransferSummary>,
}

impl ProcessReport {
    pub fn sent(&self) -> usize {
        self.count(|o| o.is_ok())
    }

    pub fn failed(&self) -> usize {
        self.count(|o| o.is_err())
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&Result<String, String>) -> bool) -> usize {
        self.transfers
            .iter()
            .filter(|t| t.outcome.as_ref().is_some_and(&pred))
            .count()
    }
}

fn summary(transfer: &DueTransfer, outcome: Option<Result<String, String>>) -> TransferSummary {
    TransferSummary {
        transfer_id: transfer.id,
        amount: transfer.amount,
        currency: transfer.currency.clone(),
        destination: transfer.gateway_account_id.clone(),
        outcome,
    }
}

/// List the transfers that a run on `date` would execute, without executing.
pub async fn preview_due(pool: &PgPool, date: Date) -> Result<ProcessReport, sqlx::Error> {
    let due = TransferRepo::list_due(pool, date).await?;
    Ok(ProcessReport {
        date: Some(date),
        dry_run: true,
        transfers: due.iter().map(|t| summary(t, None)).collect(),
    })
}

/// Executes due transfers through a payment gateway.
pub struct SettlementProcessor {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    policy: RetryPolicy,
}

impl SettlementProcessor {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>, policy: RetryPolicy) -> Self {
        Self {
            pool,
            gateway,
            policy,
        }
    }

    /// Execute every pending transfer due on or before `date`.
    ///
    /// Each transfer ends `Sent` or `Failed`; a batch whose transfers are all
    /// sent becomes `Paid`. Only database errors abort the run.
    pub async fn process_due(&self, date: Date) -> Result<ProcessReport, sqlx::Error> {
        let due = TransferRepo::list_due(&self.pool, date).await?;
        tracing::info!(%date, count = due.len(), "Processing due transfers");

        let mut report = ProcessReport {
            date: Some(date),
            dry_run: false,
            transfers: Vec::with_capacity(due.len()),
        };
        for transfer in &due {
            let outcome = self.execute(transfer).await?;
            report.transfers.push(summary(transfer, Some(outcome)));
        }

        tracing::info!(
            sent = report.sent(),
            failed = report.failed(),
            "Due transfer processing finished"
        );
        Ok(report)
    }

    async fn execute(&self, transfer: &DueTransfer) -> Result<Result<String, String>, sqlx::Error> {
        let request = TransferRequest {
            amount: transfer.amount,
            currency: transfer.currency.clone(),
            destination: transfer.gateway_account_id.clone(),
            transfer_group: transfer.settlement_batch_id.to_string(),
            idempotency_key: transfer.id.to_string(),
        };
        let outcome = execute_with_retry(self.gateway.as_ref(), &request, self.policy).await;
        let attempts = transfer.attempts + outcome.attempts as i32;

        match outcome.result {
            Ok(sent) => {
                TransferRepo::mark_sent(&self.pool, transfer.id, &sent.id, attempts).await?;
                let paid =
                    SettlementRepo::mark_batch_paid_if_complete(&self.pool, transfer.settlement_batch_id)
                        .await?;
                tracing::info!(
                    transfer_id = %transfer.id,
                    gateway_transfer_id = %sent.id,
                    batch_paid = paid,
                    "Transfer sent"
                );
                Ok(Ok(sent.id))
            }
            Err(e) => {
                let message = e.to_string();
                TransferRepo::mark_failed(&self.pool, transfer.id, &message, attempts).await?;
                tracing::error!(transfer_id = %transfer.id, error = %message, "Transfer failed");
                Ok(Err(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwiki_core::identifiers::new_id;

    fn line(outcome: Option<Result<String, String>>) -> TransferSummary {
        TransferSummary {
            transfer_id: new_id(),
            amount: 1,
            currency: "krw".into(),
            destination: "acct".into(),
            outcome,
        }
    }

    #[test]
    fn report_counts_outcomes() {
        let report = ProcessReport {
            date: None,
            dry_run: false,
            transfers: vec![
                line(Some(Ok("tr_1".into()))),
                line(Some(Err("declined".into()))),
                line(Some(Ok("tr_2".into()))),
            ],
        };
        assert_eq!(report.sent(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn dry_run_lines_count_as_neither() {
        let report = ProcessReport {
            date: None,
            dry_run: true,
            transfers: vec![line(None), line(None)],
        };
        assert_eq!(report.sent(), 0);
        assert!(!report.has_failures());
    }
}
