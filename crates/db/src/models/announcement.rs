//! Site announcement models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::language::Language;
use kwiki_core::types::{EntityId, Timestamp};

/// A row from the `announcements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Announcement {
    pub id: EntityId,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub category: String,
    pub title: String,
    pub content: String,
    pub published_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncement {
    pub translation_set_identifier: Option<EntityId>,
    pub language: Language,
    pub category: String,
    pub title: String,
    pub content: String,
    /// Defaults to now.
    pub published_date: Option<Timestamp>,
}

/// DTO for updating an announcement. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateAnnouncement {
    pub category: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub published_date: Option<Timestamp>,
}
