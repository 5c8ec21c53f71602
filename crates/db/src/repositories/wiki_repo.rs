//! Kind-agnostic queries over the wiki draft and published tables.
//!
//! The four resource kinds share the same workflow columns, so review,
//! publication and translation are written once here and parameterised by
//! [`ResourceKind`]. Table and column names come from static strings only.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::language::Language;
use kwiki_core::status::ApprovalStatus;
use kwiki_core::types::EntityId;
use kwiki_core::wiki::ResourceKind;

use crate::models::draft::DraftHeader;

/// Workflow columns selected into [`DraftHeader`].
const HEADER_COLUMNS: &str = "id, published_id, translation_set_identifier, language, \
                              editor_id, status_id, created_at, updated_at";

/// Content columns copied between draft and published rows.
pub fn content_columns(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Agency => "name, ceo, founded_in, description",
        ResourceKind::Group => "name, agency_id, description, image_path",
        ResourceKind::Member => {
            "name, real_name, birthday, agency_id, group_ids, career, image_path"
        }
        ResourceKind::Song => {
            "name, agency_id, group_id, member_id, lyricist, composer, release_date, \
             overview, cover_image_path"
        }
    }
}

/// Implemented by each per-kind repository so handlers can be generic over
/// the resource kind.
pub trait WikiResource {
    const KIND: ResourceKind;
}

/// Review workflow, publication and translation for any wiki resource kind.
pub struct DraftRepo;

impl DraftRepo {
    /// Load the workflow columns of a draft.
    pub async fn find_header(
        pool: &PgPool,
        kind: ResourceKind,
        id: EntityId,
    ) -> Result<Option<DraftHeader>, sqlx::Error> {
        let query = format!(
            "SELECT {HEADER_COLUMNS} FROM {} WHERE id = $1",
            kind.draft_table()
        );
        sqlx::query_as::<_, DraftHeader>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the draft currently editing a published row, if any.
    pub async fn find_header_by_published(
        pool: &PgPool,
        kind: ResourceKind,
        published_id: EntityId,
    ) -> Result<Option<DraftHeader>, sqlx::Error> {
        let query = format!(
            "SELECT {HEADER_COLUMNS} FROM {} WHERE published_id = $1",
            kind.draft_table()
        );
        sqlx::query_as::<_, DraftHeader>(&query)
            .bind(published_id)
            .fetch_optional(pool)
            .await
    }

    /// All drafts of a translation set.
    pub async fn list_translation_set(
        pool: &PgPool,
        kind: ResourceKind,
        translation_set_identifier: EntityId,
    ) -> Result<Vec<DraftHeader>, sqlx::Error> {
        let query = format!(
            "SELECT {HEADER_COLUMNS} FROM {} \
             WHERE translation_set_identifier = $1 ORDER BY created_at",
            kind.draft_table()
        );
        sqlx::query_as::<_, DraftHeader>(&query)
            .bind(translation_set_identifier)
            .fetch_all(pool)
            .await
    }

    /// Languages already published in a translation set.
    pub async fn published_languages(
        pool: &PgPool,
        kind: ResourceKind,
        translation_set_identifier: EntityId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let query = format!(
            "SELECT language FROM {} WHERE translation_set_identifier = $1",
            kind.published_table()
        );
        sqlx::query_scalar::<_, String>(&query)
            .bind(translation_set_identifier)
            .fetch_all(pool)
            .await
    }

    /// Id of the published row for a language of a translation set.
    pub async fn find_published_in_set(
        pool: &PgPool,
        kind: ResourceKind,
        translation_set_identifier: EntityId,
        language: Language,
    ) -> Result<Option<EntityId>, sqlx::Error> {
        let query = format!(
            "SELECT id FROM {} WHERE translation_set_identifier = $1 AND language = $2",
            kind.published_table()
        );
        sqlx::query_scalar::<_, EntityId>(&query)
            .bind(translation_set_identifier)
            .bind(language.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Move a draft from `from` to `to`.
    ///
    /// The transition only applies while the stored status still equals
    /// `from`; returns `None` when the row is gone or was changed concurrently.
    pub async fn update_status(
        pool: &PgPool,
        kind: ResourceKind,
        id: EntityId,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> Result<Option<DraftHeader>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET status_id = $3 WHERE id = $1 AND status_id = $2 \
             RETURNING {HEADER_COLUMNS}",
            kind.draft_table()
        );
        sqlx::query_as::<_, DraftHeader>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .fetch_optional(pool)
            .await
    }

    /// Whether a published row exists.
    pub async fn published_exists(
        pool: &PgPool,
        kind: ResourceKind,
        id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            kind.published_table()
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Number of distinct ids in `ids` that exist as published rows.
    pub async fn count_published(
        pool: &PgPool,
        kind: ResourceKind,
        ids: &[EntityId],
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE id = ANY($1)",
            kind.published_table()
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(ids)
            .fetch_one(pool)
            .await
    }

    /// Start editing a published row by copying it into a new pending draft.
    ///
    /// Returns `None` if the published row does not exist.
    pub async fn start_from_published(
        pool: &PgPool,
        kind: ResourceKind,
        published_id: EntityId,
        editor_id: EntityId,
    ) -> Result<Option<DraftHeader>, sqlx::Error> {
        let cols = content_columns(kind);
        let query = format!(
            "INSERT INTO {draft} (id, published_id, translation_set_identifier, language, \
                                  editor_id, status_id, {cols})
             SELECT $1, id, translation_set_identifier, language, $3, $4, {cols}
             FROM {published} WHERE id = $2
             RETURNING {HEADER_COLUMNS}",
            draft = kind.draft_table(),
            published = kind.published_table(),
        );
        sqlx::query_as::<_, DraftHeader>(&query)
            .bind(new_id())
            .bind(published_id)
            .bind(editor_id)
            .bind(ApprovalStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Publish an approved draft and delete it, in one transaction.
    ///
    /// Updates the linked published row, or the published row of the same
    /// translation set and language, otherwise inserts a new published row. Returns the published id, or `None` when
    /// no approved draft with this id exists.
    pub async fn publish(
        pool: &PgPool,
        kind: ResourceKind,
        id: EntityId,
    ) -> Result<Option<EntityId>, sqlx::Error> {
        let cols = content_columns(kind);
        let draft = kind.draft_table();
        let published = kind.published_table();
        let mut tx = pool.begin().await?;

        let lock = format!(
            "SELECT {HEADER_COLUMNS} FROM {draft} WHERE id = $1 AND status_id = $2 FOR UPDATE"
        );
        let header = sqlx::query_as::<_, DraftHeader>(&lock)
            .bind(id)
            .bind(ApprovalStatus::Approved.id())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(header) = header else {
            return Ok(None);
        };

        // A draft without a link still lands on the published row of its
        // translation set and language when one exists.
        let target = match header.published_id {
            Some(published_id) => Some(published_id),
            None => {
                let find = format!(
                    "SELECT id FROM {published} \
                     WHERE translation_set_identifier = $1 AND language = $2"
                );
                sqlx::query_scalar::<_, EntityId>(&find)
                    .bind(header.translation_set_identifier)
                    .bind(&header.language)
                    .fetch_optional(&mut *tx)
                    .await?
            }
        };

        let published_id = match target {
            Some(published_id) => {
                let update = format!(
                    "UPDATE {published} SET ({cols}) = \
                     (SELECT {cols} FROM {draft} WHERE id = $1) WHERE id = $2"
                );
                sqlx::query(&update)
                    .bind(id)
                    .bind(published_id)
                    .execute(&mut *tx)
                    .await?;
                published_id
            }
            None => {
                let published_id = new_id();
                let insert = format!(
                    "INSERT INTO {published} (id, translation_set_identifier, language, {cols})
                     SELECT $2, translation_set_identifier, language, {cols}
                     FROM {draft} WHERE id = $1"
                );
                sqlx::query(&insert)
                    .bind(id)
                    .bind(published_id)
                    .execute(&mut *tx)
                    .await?;
                published_id
            }
        };

        let delete = format!("DELETE FROM {draft} WHERE id = $1");
        sqlx::query(&delete).bind(id).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(Some(published_id))
    }

    /// Copy a draft into new pending drafts, one per language, in one
    /// transaction. The copies share the source's translation set.
    pub async fn translate(
        pool: &PgPool,
        kind: ResourceKind,
        id: EntityId,
        languages: &[Language],
        editor_id: EntityId,
    ) -> Result<Vec<DraftHeader>, sqlx::Error> {
        let cols = content_columns(kind);
        let query = format!(
            "INSERT INTO {draft} (id, published_id, translation_set_identifier, language, \
                                  editor_id, status_id, {cols})
             SELECT $1, NULL, translation_set_identifier, $3, $4, $5, {cols}
             FROM {draft} WHERE id = $2
             RETURNING {HEADER_COLUMNS}",
            draft = kind.draft_table(),
        );

        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(languages.len());
        for language in languages {
            let header = sqlx::query_as::<_, DraftHeader>(&query)
                .bind(new_id())
                .bind(id)
                .bind(language.as_str())
                .bind(editor_id)
                .bind(ApprovalStatus::Pending.id())
                .fetch_one(&mut *tx)
                .await?;
            created.push(header);
        }
        tx.commit().await?;
        Ok(created)
    }
}
