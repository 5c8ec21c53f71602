//! Song wiki models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::language::Language;
use kwiki_core::status::StatusId;
use kwiki_core::types::{Date, EntityId, Timestamp};

/// A row from the `songs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Song {
    pub id: EntityId,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub name: String,
    pub agency_id: Option<EntityId>,
    pub group_id: Option<EntityId>,
    pub member_id: Option<EntityId>,
    pub lyricist: Option<String>,
    pub composer: Option<String>,
    pub release_date: Option<Date>,
    pub overview: Option<String>,
    pub cover_image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `draft_songs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftSong {
    pub id: EntityId,
    pub published_id: Option<EntityId>,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub editor_id: EntityId,
    pub status_id: StatusId,
    pub name: String,
    pub agency_id: Option<EntityId>,
    pub group_id: Option<EntityId>,
    pub member_id: Option<EntityId>,
    pub lyricist: Option<String>,
    pub composer: Option<String>,
    pub release_date: Option<Date>,
    pub overview: Option<String>,
    pub cover_image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongContent {
    pub name: String,
    pub agency_id: Option<EntityId>,
    pub group_id: Option<EntityId>,
    pub member_id: Option<EntityId>,
    pub lyricist: Option<String>,
    pub composer: Option<String>,
    pub release_date: Option<Date>,
    pub overview: Option<String>,
    pub cover_image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSongDraft {
    pub translation_set_identifier: Option<EntityId>,
    pub language: Language,
    #[serde(flatten)]
    pub content: SongContent,
}
