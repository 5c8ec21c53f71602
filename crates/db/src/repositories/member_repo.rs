//! Repository for the `members` and `draft_members` tables.

use sqlx::PgPool;
use kwiki_core::language::Language;
use kwiki_core::status::{ApprovalStatus, StatusId};
use kwiki_core::types::EntityId;
use kwiki_core::wiki::ResourceKind;

use crate::models::member::{DraftMember, Member, MemberContent};
use crate::repositories::wiki_repo::WikiResource;

const COLUMNS: &str = "id, translation_set_identifier, language, name, real_name, birthday, \
                       agency_id, group_ids, career, image_path, created_at, updated_at";

const DRAFT_COLUMNS: &str = "id, published_id, translation_set_identifier, language, editor_id, \
                             status_id, name, real_name, birthday, agency_id, group_ids, career, \
                             image_path, created_at, updated_at";

/// Provides read access to published members and CRUD for member drafts.
pub struct MemberRepo;

impl WikiResource for MemberRepo {
    const KIND: ResourceKind = ResourceKind::Member;
}

impl MemberRepo {
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE id = $1");
        sqlx::query_as::<_, Member>(&query)
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
    ) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members
             WHERE ($1::TEXT IS NULL OR language = $1)
               AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
             ORDER BY name, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(language.map(Language::as_str))
            .bind(q)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Published members belonging to a group.
    pub async fn list_by_group(
        pool: &PgPool,
        group_id: EntityId,
    ) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members WHERE $1 = ANY(group_ids) ORDER BY name, id"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create_draft(
        pool: &PgPool,
        translation_set_identifier: EntityId,
        language: Language,
        editor_id: EntityId,
        input: &MemberContent,
    ) -> Result<DraftMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO draft_members
                (id, translation_set_identifier, language, editor_id, status_id,
                 name, real_name, birthday, agency_id, group_ids, career, image_path)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftMember>(&query)
            .bind(kwiki_core::identifiers::new_id())
            .bind(translation_set_identifier)
            .bind(language.as_str())
            .bind(editor_id)
            .bind(ApprovalStatus::Pending.id())
            .bind(&input.name)
            .bind(&input.real_name)
            .bind(input.birthday)
            .bind(input.agency_id)
            .bind(&input.group_ids)
            .bind(&input.career)
            .bind(&input.image_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_draft(pool: &PgPool, id: EntityId) -> Result<Option<DraftMember>, sqlx::Error> {
        let query = format!("SELECT {DRAFT_COLUMNS} FROM draft_members WHERE id = $1");
        sqlx::query_as::<_, DraftMember>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_drafts(
        pool: &PgPool,
        status_id: Option<StatusId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DraftMember>, sqlx::Error> {
        let query = format!(
            "SELECT {DRAFT_COLUMNS} FROM draft_members
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, DraftMember>(&query)
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
        input: &MemberContent,
    ) -> Result<Option<DraftMember>, sqlx::Error> {
        let query = format!(
            "UPDATE draft_members SET
                name = $3, real_name = $4, birthday = $5, agency_id = $6,
                group_ids = $7, career = $8, image_path = $9, status_id = $10
             WHERE id = $1 AND status_id = $2
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftMember>(&query)
            .bind(id)
            .bind(expected_status)
            .bind(&input.name)
            .bind(&input.real_name)
            .bind(input.birthday)
            .bind(input.agency_id)
            .bind(&input.group_ids)
            .bind(&input.career)
            .bind(&input.image_path)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }
}
