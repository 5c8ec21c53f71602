//! Repository for the `identity_sessions` table.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::types::EntityId;

use crate::models::session::{CreateSession, IdentitySession};

const COLUMNS: &str = "id, identity_id, refresh_token_hash, expires_at, is_revoked, \
                       user_agent, created_at, updated_at";

/// Provides CRUD operations for identity sessions.
pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateSession,
    ) -> Result<IdentitySession, sqlx::Error> {
        let query = format!(
            "INSERT INTO identity_sessions (id, identity_id, refresh_token_hash, expires_at, user_agent)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IdentitySession>(&query)
            .bind(new_id())
            .bind(input.identity_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Find an active session by its refresh token hash.
    ///
    /// Only returns sessions that are not revoked and not expired.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<IdentitySession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM identity_sessions
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, IdentitySession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE identity_sessions SET is_revoked = true WHERE id = $1 AND is_revoked = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke all active sessions of an identity. Returns the count revoked.
    pub async fn revoke_all_for_identity(
        pool: &PgPool,
        identity_id: EntityId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE identity_sessions SET is_revoked = true
             WHERE identity_id = $1 AND is_revoked = false",
        )
        .bind(identity_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
