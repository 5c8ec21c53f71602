//! Repository for the `agencies` and `draft_agencies` tables.

use sqlx::PgPool;
use kwiki_core::language::Language;
use kwiki_core::status::{ApprovalStatus, StatusId};
use kwiki_core::types::EntityId;
use kwiki_core::wiki::ResourceKind;

use crate::models::agency::{Agency, AgencyContent, DraftAgency};
use crate::repositories::wiki_repo::WikiResource;

const COLUMNS: &str = "id, translation_set_identifier, language, name, ceo, founded_in, \
                       description, created_at, updated_at";

const DRAFT_COLUMNS: &str = "id, published_id, translation_set_identifier, language, editor_id, \
                             status_id, name, ceo, founded_in, description, created_at, updated_at";

/// Provides read access to published agencies and CRUD for agency drafts.
pub struct AgencyRepo;

impl WikiResource for AgencyRepo {
    const KIND: ResourceKind = ResourceKind::Agency;
}

impl AgencyRepo {
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Agency>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agencies WHERE id = $1");
        sqlx::query_as::<_, Agency>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List published agencies, optionally filtered by language and a
    /// case-insensitive name fragment.
    pub async fn list(
        pool: &PgPool,
        language: Option<Language>,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Agency>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM agencies
             WHERE ($1::TEXT IS NULL OR language = $1)
               AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
             ORDER BY name, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Agency>(&query)
            .bind(language.map(Language::as_str))
            .bind(q)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Insert a new pending draft.
    pub async fn create_draft(
        pool: &PgPool,
        translation_set_identifier: EntityId,
        language: Language,
        editor_id: EntityId,
        input: &AgencyContent,
    ) -> Result<DraftAgency, sqlx::Error> {
        let query = format!(
            "INSERT INTO draft_agencies
                (id, translation_set_identifier, language, editor_id, status_id,
                 name, ceo, founded_in, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftAgency>(&query)
            .bind(kwiki_core::identifiers::new_id())
            .bind(translation_set_identifier)
            .bind(language.as_str())
            .bind(editor_id)
            .bind(ApprovalStatus::Pending.id())
            .bind(&input.name)
            .bind(&input.ceo)
            .bind(input.founded_in)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_draft(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<DraftAgency>, sqlx::Error> {
        let query = format!("SELECT {DRAFT_COLUMNS} FROM draft_agencies WHERE id = $1");
        sqlx::query_as::<_, DraftAgency>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List drafts, newest first, optionally filtered by status.
    pub async fn list_drafts(
        pool: &PgPool,
        status_id: Option<StatusId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DraftAgency>, sqlx::Error> {
        let query = format!(
            "SELECT {DRAFT_COLUMNS} FROM draft_agencies
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, DraftAgency>(&query)
            .bind(status_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Replace the content of a draft and set its status.
    ///
    /// Applies only while the stored status equals `expected_status`.
    pub async fn update_draft(
        pool: &PgPool,
        id: EntityId,
        expected_status: StatusId,
        status_id: StatusId,
        input: &AgencyContent,
    ) -> Result<Option<DraftAgency>, sqlx::Error> {
        let query = format!(
            "UPDATE draft_agencies SET
                name = $3, ceo = $4, founded_in = $5, description = $6, status_id = $7
             WHERE id = $1 AND status_id = $2
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftAgency>(&query)
            .bind(id)
            .bind(expected_status)
            .bind(&input.name)
            .bind(&input.ceo)
            .bind(input.founded_in)
            .bind(&input.description)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }
}
