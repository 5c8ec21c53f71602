//! Repository for the `accounts` and `account_members` tables.

use sqlx::PgPool;
use kwiki_core::account::MEMBER_ROLE_OWNER;
use kwiki_core::identifiers::new_id;
use kwiki_core::types::EntityId;

use crate::models::account::{Account, AccountMember, CreateAccount};

const COLUMNS: &str = "id, name, account_type, email, created_at, updated_at";

const MEMBER_COLUMNS: &str = "id, account_id, identity_id, role, created_at, updated_at";

/// Provides CRUD operations for accounts and their memberships.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert an account with `owner_id` as its first owner, in one transaction.
    pub async fn create_with_owner(
        pool: &PgPool,
        input: &CreateAccount,
        owner_id: EntityId,
    ) -> Result<Account, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO accounts (id, name, account_type, email)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(new_id())
            .bind(&input.name)
            .bind(&input.account_type)
            .bind(&input.email)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO account_members (id, account_id, identity_id, role) VALUES ($1, $2, $3, $4)",
        )
        .bind(new_id())
        .bind(account.id)
        .bind(owner_id)
        .bind(MEMBER_ROLE_OWNER)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(account)
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Accounts the identity is a member of.
    pub async fn list_for_identity(
        pool: &PgPool,
        identity_id: EntityId,
    ) -> Result<Vec<Account>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM accounts a
             JOIN account_members m ON m.account_id = a.id
             WHERE m.identity_id = $1
             ORDER BY a.created_at DESC",
            cols = prefixed("a", COLUMNS),
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(identity_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_members(
        pool: &PgPool,
        account_id: EntityId,
    ) -> Result<Vec<AccountMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM account_members WHERE account_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, AccountMember>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_member(
        pool: &PgPool,
        account_id: EntityId,
        identity_id: EntityId,
    ) -> Result<Option<AccountMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM account_members
             WHERE account_id = $1 AND identity_id = $2"
        );
        sqlx::query_as::<_, AccountMember>(&query)
            .bind(account_id)
            .bind(identity_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the identity owns the account.
    pub async fn is_owner(
        pool: &PgPool,
        account_id: EntityId,
        identity_id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM account_members
                           WHERE account_id = $1 AND identity_id = $2 AND role = $3)",
        )
        .bind(account_id)
        .bind(identity_id)
        .bind(MEMBER_ROLE_OWNER)
        .fetch_one(pool)
        .await
    }

    pub async fn count_owners(pool: &PgPool, account_id: EntityId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM account_members WHERE account_id = $1 AND role = $2",
        )
        .bind(account_id)
        .bind(MEMBER_ROLE_OWNER)
        .fetch_one(pool)
        .await
    }

    pub async fn add_member(
        pool: &PgPool,
        account_id: EntityId,
        identity_id: EntityId,
        role: &str,
    ) -> Result<AccountMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO account_members (id, account_id, identity_id, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, AccountMember>(&query)
            .bind(new_id())
            .bind(account_id)
            .bind(identity_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    pub async fn update_member_role(
        pool: &PgPool,
        account_id: EntityId,
        identity_id: EntityId,
        role: &str,
    ) -> Result<Option<AccountMember>, sqlx::Error> {
        let query = format!(
            "UPDATE account_members SET role = $3
             WHERE account_id = $1 AND identity_id = $2
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, AccountMember>(&query)
            .bind(account_id)
            .bind(identity_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a membership was deleted.
    pub async fn remove_member(
        pool: &PgPool,
        account_id: EntityId,
        identity_id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM account_members WHERE account_id = $1 AND identity_id = $2")
                .bind(account_id)
                .bind(identity_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Qualify each column of a comma-separated list with a table alias.
fn prefixed(alias: &str, columns: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_qualifies_every_column() {
        assert_eq!(prefixed("a", "id, name"), "a.id, a.name");
    }
}
