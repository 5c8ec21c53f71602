//! Repository for the `groups` and `draft_groups` tables.

use sqlx::PgPool;
use kwiki_core::language::Language;
use kwiki_core::status::{ApprovalStatus, StatusId};
use kwiki_core::types::EntityId;
use kwiki_core::wiki::ResourceKind;

use crate::models::group::{DraftGroup, Group, GroupContent};
use crate::repositories::wiki_repo::WikiResource;

const COLUMNS: &str = "id, translation_set_identifier, language, name, agency_id, description, \
                       image_path, created_at, updated_at";

const DRAFT_COLUMNS: &str = "id, published_id, translation_set_identifier, language, editor_id, \
                             status_id, name, agency_id, description, image_path, \
                             created_at, updated_at";

/// Provides read access to published groups and CRUD for group drafts.
pub struct GroupRepo;

impl WikiResource for GroupRepo {
    const KIND: ResourceKind = ResourceKind::Group;
}

impl GroupRepo {
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        language: Option<Language>,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM groups
             WHERE ($1::TEXT IS NULL OR language = $1)
               AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
             ORDER BY name, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(language.map(Language::as_str))
            .bind(q)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn create_draft(
        pool: &PgPool,
        translation_set_identifier: EntityId,
        language: Language,
        editor_id: EntityId,
        input: &GroupContent,
    ) -> Result<DraftGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO draft_groups
                (id, translation_set_identifier, language, editor_id, status_id,
                 name, agency_id, description, image_path)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftGroup>(&query)
            .bind(kwiki_core::identifiers::new_id())
            .bind(translation_set_identifier)
            .bind(language.as_str())
            .bind(editor_id)
            .bind(ApprovalStatus::Pending.id())
            .bind(&input.name)
            .bind(input.agency_id)
            .bind(&input.description)
            .bind(&input.image_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_draft(pool: &PgPool, id: EntityId) -> Result<Option<DraftGroup>, sqlx::Error> {
        let query = format!("SELECT {DRAFT_COLUMNS} FROM draft_groups WHERE id = $1");
        sqlx::query_as::<_, DraftGroup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_drafts(
        pool: &PgPool,
        status_id: Option<StatusId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DraftGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {DRAFT_COLUMNS} FROM draft_groups
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, DraftGroup>(&query)
            .bind(status_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update_draft(
        pool: &PgPool,
        id: EntityId,
        expected_status: StatusId,
        status_id: StatusId,
        input: &GroupContent,
    ) -> Result<Option<DraftGroup>, sqlx::Error> {
        let query = format!(
            "UPDATE draft_groups SET
                name = $3, agency_id = $4, description = $5, image_path = $6, status_id = $7
             WHERE id = $1 AND status_id = $2
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftGroup>(&query)
            .bind(id)
            .bind(expected_status)
            .bind(&input.name)
            .bind(input.agency_id)
            .bind(&input.description)
            .bind(&input.image_path)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }
}
