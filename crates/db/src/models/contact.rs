//! Contact form submissions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use kwiki_core::types::{EntityId, Timestamp};

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: EntityId,
    /// ULID handed back to the sender.
    pub reference: String,
    pub category: String,
    pub name: String,
    pub email: String,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContact {
    pub category: String,
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub content: String,
}
