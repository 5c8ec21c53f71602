//! Identity (login) and principal (wiki role holder) models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::types::{EntityId, Timestamp};

/// Full row from the `identities` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`IdentityResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub language: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe identity representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct IdentityResponse {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub language: String,
    /// Resolved principal role (e.g. `"collaborator"`).
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl IdentityResponse {
    pub fn new(identity: &Identity, role: &str) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            language: identity.language.clone(),
            role: role.to_string(),
            is_active: identity.is_active,
            last_login_at: identity.last_login_at,
            created_at: identity.created_at,
        }
    }
}

/// DTO for creating a new identity.
#[derive(Debug)]
pub struct CreateIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub language: String,
}

/// A row from the `principals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Principal {
    pub id: EntityId,
    pub identity_id: EntityId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for changing a principal's role.
#[derive(Debug, Deserialize)]
pub struct UpdatePrincipalRole {
    pub role: String,
}
