//! Account and account membership models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use kwiki_core::types::{EntityId, Timestamp};

/// A row from the `accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: EntityId,
    pub name: String,
    pub account_type: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an account. The caller becomes its first owner.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccount {
    pub name: String,
    pub account_type: String,
    #[validate(email)]
    pub email: String,
}

/// A row from the `account_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountMember {
    pub id: EntityId,
    pub account_id: EntityId,
    pub identity_id: EntityId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct AddAccountMember {
    pub identity_id: EntityId,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountMemberRole {
    pub role: String,
}
