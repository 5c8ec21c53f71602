//! Auth code storage and cleanup.

use chrono::{Duration, Utc};
use kwiki_db::models::auth_code::CreateAuthCode;
use kwiki_db::repositories::AuthCodeRepo;
use sqlx::PgPool;

fn code(email: &str, expires_in: Duration) -> CreateAuthCode {
    CreateAuthCode {
        email: email.to_string(),
        language: "ko".to_string(),
        code_hash: "0".repeat(64),
        expires_at: Utc::now() + expires_in,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn purge_removes_expired_and_consumed_codes(pool: PgPool) {
    AuthCodeRepo::create(&pool, &code("old@example.com", Duration::minutes(-1)))
        .await
        .unwrap();
    let used = AuthCodeRepo::create(&pool, &code("used@example.com", Duration::minutes(15)))
        .await
        .unwrap();
    assert!(AuthCodeRepo::consume(&pool, used.id).await.unwrap());
    AuthCodeRepo::create(&pool, &code("live@example.com", Duration::minutes(15)))
        .await
        .unwrap();

    assert_eq!(AuthCodeRepo::purge_expired(&pool).await.unwrap(), 2);
    assert!(AuthCodeRepo::find_latest_active(&pool, "live@example.com")
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn a_code_is_consumed_once(pool: PgPool) {
    let created = AuthCodeRepo::create(&pool, &code("a@example.com", Duration::minutes(15)))
        .await
        .unwrap();
    assert!(AuthCodeRepo::consume(&pool, created.id).await.unwrap());
    assert!(!AuthCodeRepo::consume(&pool, created.id).await.unwrap());
    assert!(AuthCodeRepo::find_latest_active(&pool, "a@example.com")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_attempts_exhaust_a_code(pool: PgPool) {
    let created = AuthCodeRepo::create(&pool, &code("b@example.com", Duration::minutes(15)))
        .await
        .unwrap();
    assert_eq!(created.attempts, 0);

    for expected in 1..3 {
        let attempts = AuthCodeRepo::record_failed_attempt(&pool, created.id, 3)
            .await
            .unwrap();
        assert_eq!(attempts, Some(expected));
    }
    assert!(AuthCodeRepo::find_latest_active(&pool, "b@example.com")
        .await
        .unwrap()
        .is_some());

    let attempts = AuthCodeRepo::record_failed_attempt(&pool, created.id, 3)
        .await
        .unwrap();
    assert_eq!(attempts, Some(3));
    assert!(AuthCodeRepo::find_latest_active(&pool, "b@example.com")
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        AuthCodeRepo::record_failed_attempt(&pool, created.id, 3)
            .await
            .unwrap(),
        None
    );
}
