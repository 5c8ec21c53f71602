//! Member (idol) wiki models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::language::Language;
use kwiki_core::status::StatusId;
use kwiki_core::types::{Date, EntityId, Timestamp};

/// A row from the `members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: EntityId,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub name: String,
    pub real_name: Option<String>,
    pub birthday: Option<Date>,
    pub agency_id: Option<EntityId>,
    pub group_ids: Vec<EntityId>,
    pub career: Option<String>,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `draft_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftMember {
    pub id: EntityId,
    pub published_id: Option<EntityId>,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub editor_id: EntityId,
    pub status_id: StatusId,
    pub name: String,
    pub real_name: Option<String>,
    pub birthday: Option<Date>,
    pub agency_id: Option<EntityId>,
    pub group_ids: Vec<EntityId>,
    pub career: Option<String>,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberContent {
    pub name: String,
    pub real_name: Option<String>,
    pub birthday: Option<Date>,
    pub agency_id: Option<EntityId>,
    #[serde(default)]
    pub group_ids: Vec<EntityId>,
    pub career: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberDraft {
    pub translation_set_identifier: Option<EntityId>,
    pub language: Language,
    #[serde(flatten)]
    pub content: MemberContent,
}
