//! Repository for the `announcements` table.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::language::Language;
use kwiki_core::types::{EntityId, Timestamp};

use crate::models::announcement::{Announcement, UpdateAnnouncement};

const COLUMNS: &str = "id, translation_set_identifier, language, category, title, content, \
                       published_date, created_at, updated_at";

/// Values of a new announcement after defaults are applied.
#[derive(Debug)]
pub struct NewAnnouncement<'a> {
    pub translation_set_identifier: EntityId,
    pub language: Language,
    pub category: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub published_date: Timestamp,
}

/// Provides CRUD operations for announcements.
pub struct AnnouncementRepo;

impl AnnouncementRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewAnnouncement<'_>,
    ) -> Result<Announcement, sqlx::Error> {
        let query = format!(
            "INSERT INTO announcements
                (id, translation_set_identifier, language, category, title, content, published_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Announcement>(&query)
            .bind(new_id())
            .bind(input.translation_set_identifier)
            .bind(input.language.as_str())
            .bind(input.category)
            .bind(input.title)
            .bind(input.content)
            .bind(input.published_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<Announcement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM announcements WHERE id = $1");
        sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Announcements in one language, newest first.
    ///
    /// With `published_only`, rows scheduled for the future are hidden.
    pub async fn list(
        pool: &PgPool,
        language: Language,
        published_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Announcement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM announcements
             WHERE language = $1 AND (NOT $2 OR published_date <= NOW())
             ORDER BY published_date DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Announcement>(&query)
            .bind(language.as_str())
            .bind(published_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update an announcement. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateAnnouncement,
    ) -> Result<Option<Announcement>, sqlx::Error> {
        let query = format!(
            "UPDATE announcements SET
                category = COALESCE($2, category),
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                published_date = COALESCE($5, published_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .bind(&input.category)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.published_date)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
