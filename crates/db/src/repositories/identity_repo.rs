//! Repository for the `identities` and `principals` tables.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::types::{EntityId, Timestamp};

use crate::models::identity::{CreateIdentity, Identity, Principal};

const COLUMNS: &str = "id, username, email, password_hash, language, is_active, \
                       last_login_at, failed_login_count, locked_until, created_at, updated_at";

const PRINCIPAL_COLUMNS: &str = "id, identity_id, role, created_at, updated_at";

/// Provides CRUD operations for identities and their login bookkeeping.
pub struct IdentityRepo;

impl IdentityRepo {
    /// Insert an identity and its principal in one transaction.
    pub async fn create_with_principal(
        pool: &PgPool,
        input: &CreateIdentity,
        role: &str,
    ) -> Result<(Identity, Principal), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO identities (id, username, email, password_hash, language)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let identity = sqlx::query_as::<_, Identity>(&query)
            .bind(new_id())
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.language)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO principals (id, identity_id, role)
             VALUES ($1, $2, $3)
             RETURNING {PRINCIPAL_COLUMNS}"
        );
        let principal = sqlx::query_as::<_, Principal>(&query)
            .bind(new_id())
            .bind(identity.id)
            .bind(role)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((identity, principal))
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Identity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE id = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an identity by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Identity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE email = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM identities WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: EntityId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE identities SET failed_login_count = failed_login_count + 1 WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Lock an identity until the specified timestamp.
    pub async fn lock_until(pool: &PgPool, id: EntityId, until: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE identities SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Reset the lockout counters and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: EntityId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE identities SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Provides access to wiki principals.
pub struct PrincipalRepo;

impl PrincipalRepo {
    pub async fn find_by_identity(
        pool: &PgPool,
        identity_id: EntityId,
    ) -> Result<Option<Principal>, sqlx::Error> {
        let query = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE identity_id = $1");
        sqlx::query_as::<_, Principal>(&query)
            .bind(identity_id)
            .fetch_optional(pool)
            .await
    }

    /// Change a principal's role. Returns `None` if the identity has no principal.
    pub async fn update_role(
        pool: &PgPool,
        identity_id: EntityId,
        role: &str,
    ) -> Result<Option<Principal>, sqlx::Error> {
        let query = format!(
            "UPDATE principals SET role = $2 WHERE identity_id = $1 RETURNING {PRINCIPAL_COLUMNS}"
        );
        sqlx::query_as::<_, Principal>(&query)
            .bind(identity_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }
}
