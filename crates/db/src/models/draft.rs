//! Columns shared by every wiki draft table.

use serde::Serialize;
use sqlx::FromRow;
use kwiki_core::language::Language;
use kwiki_core::status::{ApprovalStatus, StatusId};
use kwiki_core::types::{EntityId, Timestamp};
use kwiki_core::error::CoreError;

/// The workflow-relevant part of a draft row, independent of resource kind.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftHeader {
    pub id: EntityId,
    pub published_id: Option<EntityId>,
    pub translation_set_identifier: EntityId,
    pub language: String,
    pub editor_id: EntityId,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DraftHeader {
    pub fn status(&self) -> Result<ApprovalStatus, CoreError> {
        ApprovalStatus::from_id(self.status_id)
    }

    pub fn language(&self) -> Result<Language, CoreError> {
        self.language
            .parse()
            .map_err(|_| CoreError::Internal(format!("Stored language '{}' is invalid", self.language)))
    }
}
