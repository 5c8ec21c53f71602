//! Request handlers, one module per resource.
//!
//! Handlers validate input with `kwiki_core`, delegate persistence to the
//! repositories in `kwiki_db`, publish events on the bus and map every failure
//! through [`AppError`](crate::error::AppError).

pub mod account;
pub mod affiliation;
pub mod announcement;
pub mod contact;
pub mod identity;
pub mod payment;
pub mod settlement;
pub mod wiki;

use kwiki_core::error::CoreError;
use kwiki_core::types::EntityId;
use kwiki_db::models::account::Account;
use kwiki_db::repositories::AccountRepo;
use sqlx::PgPool;

use crate::error::AppResult;

/// Load an account the caller belongs to.
///
/// 404 when the account does not exist, 403 when the caller is not a member.
pub(crate) async fn require_member(
    pool: &PgPool,
    account_id: EntityId,
    identity_id: EntityId,
) -> AppResult<Account> {
    let account = find_account(pool, account_id).await?;
    if AccountRepo::find_member(pool, account_id, identity_id)
        .await?
        .is_none()
    {
        return Err(CoreError::Forbidden("Not a member of this account".into()).into());
    }
    Ok(account)
}

/// Load an account the caller owns. 404 / 403 as for [`require_member`].
pub(crate) async fn require_owner(
    pool: &PgPool,
    account_id: EntityId,
    identity_id: EntityId,
) -> AppResult<Account> {
    let account = find_account(pool, account_id).await?;
    if !AccountRepo::is_owner(pool, account_id, identity_id).await? {
        return Err(CoreError::Forbidden("Only account owners may do this".into()).into());
    }
    Ok(account)
}

pub(crate) async fn find_account(pool: &PgPool, account_id: EntityId) -> AppResult<Account> {
    AccountRepo::find_by_id(pool, account_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Account",
                id: account_id,
            }
            .into()
        })
}
