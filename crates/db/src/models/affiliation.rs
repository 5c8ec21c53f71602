//! Agency/talent affiliation models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use kwiki_core::money::Percentage;
use kwiki_core::status::StatusId;
use kwiki_core::types::{EntityId, Timestamp};

/// A row from the `affiliations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Affiliation {
    pub id: EntityId,
    pub agency_account_id: EntityId,
    pub talent_account_id: EntityId,
    /// `"agency"` or `"talent"`.
    pub requested_by: String,
    pub status_id: StatusId,
    pub agency_share_percent: i16,
    pub activated_at: Option<Timestamp>,
    pub terminated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for requesting an affiliation. `requested_by` is derived from which
/// side the caller owns.
#[derive(Debug, Deserialize)]
pub struct RequestAffiliation {
    pub agency_account_id: EntityId,
    pub talent_account_id: EntityId,
    pub agency_share_percent: Percentage,
}
