//! Identity session model and DTOs.

use sqlx::FromRow;
use kwiki_core::types::{EntityId, Timestamp};

/// A session row from the `identity_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct IdentitySession {
    pub id: EntityId,
    pub identity_id: EntityId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub identity_id: EntityId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
}
