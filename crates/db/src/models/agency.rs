//! Agency wiki models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::language::Language;
use kwiki_core::status::StatusId;
use kwiki_core::types::{Date, EntityId, Timestamp};

/// A row from the `agencies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Agency {
    pub id: EntityId,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub name: String,
    pub ceo: Option<String>,
    pub founded_in: Option<Date>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `draft_agencies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftAgency {
    pub id: EntityId,
    pub published_id: Option<EntityId>,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub editor_id: EntityId,
    pub status_id: StatusId,
    pub name: String,
    pub ceo: Option<String>,
    pub founded_in: Option<Date>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Editable agency fields. Editing a draft replaces all of them.
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyContent {
    pub name: String,
    pub ceo: Option<String>,
    pub founded_in: Option<Date>,
    pub description: Option<String>,
}

/// DTO for creating an agency draft.
#[derive(Debug, Deserialize)]
pub struct CreateAgencyDraft {
    /// Joins an existing translation set; a new one is started when absent.
    pub translation_set_identifier: Option<EntityId>,
    pub language: Language,
    #[serde(flatten)]
    pub content: AgencyContent,
}
