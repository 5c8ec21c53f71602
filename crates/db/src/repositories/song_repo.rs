//! Repository for the `songs` and `draft_songs` tables.

use sqlx::PgPool;
use kwiki_core::language::Language;
use kwiki_core::status::{ApprovalStatus, StatusId};
use kwiki_core::types::EntityId;
use kwiki_core::wiki::ResourceKind;

use crate::models::song::{DraftSong, Song, SongContent};
use crate::repositories::wiki_repo::WikiResource;

const COLUMNS: &str = "id, translation_set_identifier, language, name, agency_id, group_id, \
                       member_id, lyricist, composer, release_date, overview, cover_image_path, \
                       created_at, updated_at";

const DRAFT_COLUMNS: &str = "id, published_id, translation_set_identifier, language, editor_id, \
                             status_id, name, agency_id, group_id, member_id, lyricist, composer, \
                             release_date, overview, cover_image_path, created_at, updated_at";

/// Provides read access to published songs and CRUD for song drafts.
pub struct SongRepo;

impl WikiResource for SongRepo {
    const KIND: ResourceKind = ResourceKind::Song;
}

impl SongRepo {
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Song>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM songs WHERE id = $1");
        sqlx::query_as::<_, Song>(&query)
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
    ) -> Result<Vec<Song>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM songs
             WHERE ($1::TEXT IS NULL OR language = $1)
               AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
             ORDER BY release_date DESC NULLS LAST, name, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Song>(&query)
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
        input: &SongContent,
    ) -> Result<DraftSong, sqlx::Error> {
        let query = format!(
            "INSERT INTO draft_songs
                (id, translation_set_identifier, language, editor_id, status_id,
                 name, agency_id, group_id, member_id, lyricist, composer,
                 release_date, overview, cover_image_path)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftSong>(&query)
            .bind(kwiki_core::identifiers::new_id())
            .bind(translation_set_identifier)
            .bind(language.as_str())
            .bind(editor_id)
            .bind(ApprovalStatus::Pending.id())
            .bind(&input.name)
            .bind(input.agency_id)
            .bind(input.group_id)
            .bind(input.member_id)
            .bind(&input.lyricist)
            .bind(&input.composer)
            .bind(input.release_date)
            .bind(&input.overview)
            .bind(&input.cover_image_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_draft(pool: &PgPool, id: EntityId) -> Result<Option<DraftSong>, sqlx::Error> {
        let query = format!("SELECT {DRAFT_COLUMNS} FROM draft_songs WHERE id = $1");
        sqlx::query_as::<_, DraftSong>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_drafts(
        pool: &PgPool,
        status_id: Option<StatusId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DraftSong>, sqlx::Error> {
        let query = format!(
            "SELECT {DRAFT_COLUMNS} FROM draft_songs
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, DraftSong>(&query)
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
        input: &SongContent,
    ) -> Result<Option<DraftSong>, sqlx::Error> {
        let query = format!(
            "UPDATE draft_songs SET
                name = $3, agency_id = $4, group_id = $5, member_id = $6,
                lyricist = $7, composer = $8, release_date = $9, overview = $10,
                cover_image_path = $11, status_id = $12
             WHERE id = $1 AND status_id = $2
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, DraftSong>(&query)
            .bind(id)
            .bind(expected_status)
            .bind(&input.name)
            .bind(input.agency_id)
            .bind(input.group_id)
            .bind(input.member_id)
            .bind(&input.lyricist)
            .bind(&input.composer)
            .bind(input.release_date)
            .bind(&input.overview)
            .bind(&input.cover_image_path)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }
}
