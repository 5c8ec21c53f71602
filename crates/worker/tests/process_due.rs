//! Integration tests for due-transfer processing against a real database
//! and the in-memory gateway.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::roles::ROLE_COLLABORATOR;
use kwiki_core::settlement::RetryPolicy;
use kwiki_core::status::{SettlementBatchStatus, TransferStatus};
use kwiki_core::types::{Date, EntityId};
use kwiki_db::models::account::CreateAccount;
use kwiki_db::models::identity::CreateIdentity;
use kwiki_db::models::settlement::{CreateSettlementAccount, NewTransfer};
use kwiki_db::repositories::settlement_repo::NewBatch;
use kwiki_db::repositories::{AccountRepo, IdentityRepo, SettlementRepo, TransferRepo};
use kwiki_payments::memory::InMemoryGateway;
use kwiki_worker::processor::preview_due;
use kwiki_worker::SettlementProcessor;

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_tries: 3,
        backoff: Duration::ZERO,
    }
}

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

/// Create a closed batch with two transfers due on `due_on`.
async fn seed_batch(pool: &PgPool, due_on: Date) -> (EntityId, Vec<EntityId>) {
    let (identity, _) = IdentityRepo::create_with_principal(
        pool,
        &CreateIdentity {
            username: "owner".into(),
            email: format!("{}@example.com", new_id()),
            password_hash: "hash".into(),
            language: "ko".into(),
        },
        ROLE_COLLABORATOR,
    )
    .await
    .unwrap();

    let mut settlement_accounts = Vec::new();
    for (account_type, gateway_account_id) in [("talent", "acct_talent"), ("agency", "acct_agency")] {
        let account = AccountRepo::create_with_owner(
            pool,
            &CreateAccount {
                name: format!("{account_type} account"),
                account_type: account_type.into(),
                email: "billing@example.com".into(),
            },
            identity.id,
        )
        .await
        .unwrap();
        let sa = SettlementRepo::create_account(
            pool,
            &CreateSettlementAccount {
                account_id: account.id,
                gateway_account_id: gateway_account_id.into(),
                currency: "krw".into(),
            },
        )
        .await
        .unwrap();
        settlement_accounts.push((account.id, sa.id));
    }

    let (batch, transfers) = SettlementRepo::create_batch(
        pool,
        &NewBatch {
            account_id: settlement_accounts[0].0,
            currency: "krw".into(),
            period_start: date(2024, 3, 1),
            period_end: date(2024, 4, 1),
            gross_amount: 10_000,
            fee_amount: 1_000,
            net_amount: 9_000,
            due_on,
        },
        &[],
        &[
            NewTransfer {
                settlement_account_id: settlement_accounts[0].1,
                amount: 6_300,
            },
            NewTransfer {
                settlement_account_id: settlement_accounts[1].1,
                amount: 2_700,
            },
        ],
    )
    .await
    .unwrap()
    .unwrap();
    (batch.id, transfers.iter().map(|t| t.id).collect())
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_sent_marks_batch_paid(pool: PgPool) {
    let (batch_id, transfer_ids) = seed_batch(&pool, date(2024, 4, 8)).await;
    let gateway = Arc::new(InMemoryGateway::new());
    let processor = SettlementProcessor::new(pool.clone(), gateway.clone(), policy());

    let report = processor.process_due(date(2024, 4, 8)).await.unwrap();
    assert_eq!(report.sent(), 2);
    assert!(!report.has_failures());
    assert_eq!(gateway.sent_transfers().len(), 2);

    for id in transfer_ids {
        let transfer = TransferRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(transfer.status_id, TransferStatus::Sent.id());
        assert_eq!(transfer.attempts, 1);
    }
    let batch = SettlementRepo::find_batch(&pool, batch_id).await.unwrap().unwrap();
    assert_eq!(batch.status_id, SettlementBatchStatus::Paid.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_not_yet_due_is_skipped(pool: PgPool) {
    seed_batch(&pool, date(2024, 4, 8)).await;
    let gateway = Arc::new(InMemoryGateway::new());
    let processor = SettlementProcessor::new(pool.clone(), gateway.clone(), policy());

    let report = processor.process_due(date(2024, 4, 7)).await.unwrap();
    assert!(report.transfers.is_empty());
    assert!(gateway.sent_transfers().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exhausted_retries_fail_transfer(pool: PgPool) {
    let (batch_id, _) = seed_batch(&pool, date(2024, 4, 8)).await;
    let gateway = Arc::new(InMemoryGateway::new());
    // The first transfer uses up all three tries; the second succeeds.
    gateway.fail_next_transfers(3);
    let processor = SettlementProcessor::new(pool.clone(), gateway.clone(), policy());

    let report = processor.process_due(date(2024, 4, 30)).await.unwrap();
    assert_eq!(report.sent(), 1);
    assert_eq!(report.failed(), 1);

    let failed = report
        .transfers
        .iter()
        .find(|t| matches!(t.outcome, Some(Err(_))))
        .unwrap();
    let row = TransferRepo::find_by_id(&pool, failed.transfer_id).await.unwrap().unwrap();
    assert_eq!(row.status_id, TransferStatus::Failed.id());
    assert_eq!(row.attempts, 3);
    assert!(row.last_error.unwrap().contains("503"));

    let batch = SettlementRepo::find_batch(&pool, batch_id).await.unwrap().unwrap();
    assert_eq!(batch.status_id, SettlementBatchStatus::Closed.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dry_run_changes_nothing(pool: PgPool) {
    let (_, transfer_ids) = seed_batch(&pool, date(2024, 4, 8)).await;

    let report = preview_due(&pool, date(2024, 4, 8)).await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.transfers.len(), 2);
    assert!(report.transfers.iter().all(|t| t.outcome.is_none()));

    for id in transfer_ids {
        let transfer = TransferRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(transfer.status_id, TransferStatus::Pending.id());
    }
}
