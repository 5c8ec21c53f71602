//! Repository for the `auth_codes` table.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::types::EntityId;

use crate::models::auth_code::{AuthCode, CreateAuthCode};

const COLUMNS: &str = "id, email, language, code_hash, expires_at, consumed_at, attempts, created_at";

/// Stores hashed e-mail verification codes.
pub struct AuthCodeRepo;

impl AuthCodeRepo {
    pub async fn create(pool: &PgPool, input: &CreateAuthCode) -> Result<AuthCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO auth_codes (id, email, language, code_hash, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuthCode>(&query)
            .bind(new_id())
            .bind(&input.email)
            .bind(&input.language)
            .bind(&input.code_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// The most recently issued code for an email that is unconsumed and unexpired.
    pub async fn find_latest_active(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<AuthCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM auth_codes
             WHERE email = $1 AND consumed_at IS NULL AND expires_at > NOW()
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, AuthCode>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Mark a code as used. Returns `false` if it was already consumed.
    pub async fn consume(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE auth_codes SET consumed_at = NOW() WHERE id = $1 AND consumed_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a wrong code against `id`. The code is consumed once
    /// `max_attempts` is reached. Returns the new attempt count, or `None` if
    /// the code was already consumed.
    pub async fn record_failed_attempt(
        pool: &PgPool,
        id: EntityId,
        max_attempts: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE auth_codes
             SET attempts = attempts + 1,
                 consumed_at = CASE WHEN attempts + 1 >= $2 THEN NOW() ELSE consumed_at END
             WHERE id = $1 AND consumed_at IS NULL
             RETURNING attempts",
        )
        .bind(id)
        .bind(max_attempts)
        .fetch_optional(pool)
        .await
    }

    /// Delete expired or consumed codes. Returns the count of deleted rows.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM auth_codes WHERE expires_at < NOW() OR consumed_at IS NOT NULL")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
