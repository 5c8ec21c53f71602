//! Repository for the `contacts` table.

use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::types::EntityId;

use crate::models::contact::{Contact, CreateContact};

const COLUMNS: &str = "id, reference, category, name, email, content, created_at";

/// Stores contact form submissions.
pub struct ContactRepo;

impl ContactRepo {
    pub async fn create(
        pool: &PgPool,
        reference: &str,
        input: &CreateContact,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (id, reference, category, name, email, content)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(new_id())
            .bind(reference)
            .bind(&input.category)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest first, optionally filtered by category.
    pub async fn list(
        pool: &PgPool,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
