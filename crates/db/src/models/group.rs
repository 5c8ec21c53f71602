//! Group wiki models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::language::Language;
use kwiki_core::status::StatusId;
use kwiki_core::types::{EntityId, Timestamp};

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: EntityId,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub name: String,
    pub agency_id: Option<EntityId>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `draft_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftGroup {
    pub id: EntityId,
    pub published_id: Option<EntityId>,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub editor_id: EntityId,
    pub status_id: StatusId,
    pub name: String,
    pub agency_id: Option<EntityId>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupContent {
    pub name: String,
    pub agency_id: Option<EntityId>,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupDraft {
    pub translation_set_identifier: Option<EntityId>,
    pub language: Language,
    #[serde(flatten)]
    pub content: GroupContent,
}
