//! Repository for the `affiliations` table.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::money::Percentage;
use kwiki_core::status::{AffiliationStatus, StatusId};
use kwiki_core::types::EntityId;

use crate::models::affiliation::Affiliation;

const COLUMNS: &str = "id, agency_account_id, talent_account_id, requested_by, status_id, \
                       agency_share_percent, activated_at, terminated_at, created_at, updated_at";

/// Provides CRUD operations for affiliations.
pub struct AffiliationRepo;

impl AffiliationRepo {
    /// Insert a pending affiliation request.
    pub async fn create(
        pool: &PgPool,
        agency_account_id: EntityId,
        talent_account_id: EntityId,
        requested_by: &str,
        agency_share: Percentage,
    ) -> Result<Affiliation, sqlx::Error> {
        let query = format!(
            "INSERT INTO affiliations
                (id, agency_account_id, talent_account_id, requested_by, status_id, agency_share_percent)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Affiliation>(&query)
            .bind(new_id())
            .bind(agency_account_id)
            .bind(talent_account_id)
            .bind(requested_by)
            .bind(AffiliationStatus::Pending.id())
            .bind(agency_share.value())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Affiliation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM affiliations WHERE id = $1");
        sqlx::query_as::<_, Affiliation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Affiliations where the account is on either side, newest first.
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: EntityId,
    ) -> Result<Vec<Affiliation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM affiliations
             WHERE agency_account_id = $1 OR talent_account_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Affiliation>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Status ids of every affiliation between the two accounts.
    pub async fn statuses_for_pair(
        pool: &PgPool,
        agency_account_id: EntityId,
        talent_account_id: EntityId,
    ) -> Result<Vec<StatusId>, sqlx::Error> {
        sqlx::query_scalar::<_, StatusId>(
            "SELECT status_id FROM affiliations
             WHERE agency_account_id = $1 AND talent_account_id = $2",
        )
        .bind(agency_account_id)
        .bind(talent_account_id)
        .fetch_all(pool)
        .await
    }

    /// The active affiliation in which the account is the talent side.
    pub async fn find_active_for_talent(
        pool: &PgPool,
        talent_account_id: EntityId,
    ) -> Result<Option<Affiliation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM affiliations
             WHERE talent_account_id = $1 AND status_id = $2
             ORDER BY activated_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Affiliation>(&query)
            .bind(talent_account_id)
            .bind(AffiliationStatus::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Move an affiliation from `from` to `to`, stamping `activated_at` or
    /// `terminated_at` as appropriate. Returns `None` if the stored status
    /// no longer equals `from`.
    pub async fn transition(
        pool: &PgPool,
        id: EntityId,
        from: AffiliationStatus,
        to: AffiliationStatus,
    ) -> Result<Option<Affiliation>, sqlx::Error> {
        let query = format!(
            "UPDATE affiliations SET
                status_id = $3,
                activated_at = CASE WHEN $3 = $4 THEN NOW() ELSE activated_at END,
                terminated_at = CASE WHEN $3 = $5 THEN NOW() ELSE terminated_at END
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Affiliation>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(AffiliationStatus::Active.id())
            .bind(AffiliationStatus::Terminated.id())
            .fetch_optional(pool)
            .await
    }
}
