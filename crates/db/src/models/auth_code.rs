//! E-mail verification code rows.

use sqlx::FromRow;
use kwiki_core::types::{EntityId, Timestamp};

/// A row from the `auth_codes` table. Only the code hash is stored.
#[derive(Debug, Clone, FromRow)]
pub struct AuthCode {
    pub id: EntityId,
    pub email: String,
    pub language: String,
    pub code_hash: String,
    pub expires_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
    /// Wrong codes entered against this row.
    pub attempts: i32,
    pub created_at: Timestamp,
}

/// DTO for storing a freshly issued code.
pub struct CreateAuthCode {
    pub email: String,
    pub language: String,
    pub code_hash: String,
    pub expires_at: Timestamp,
}
