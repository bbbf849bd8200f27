//! Repository for the `slides` table.
//!
//! One row per edited position. Rows are only ever inserted or updated in
//! place; positions are never renumbered.

use pitchdeck_core::types::Position;
use sqlx::PgPool;

use crate::models::slide::{SlideRow, UpsertSlide};

/// Column list for `slides` queries.
const COLUMNS: &str = "\
    id, position, title, content, image_url, revision, \
    created_at, updated_at";

/// Provides data access for slide overrides.
pub struct SlideRepo;

impl SlideRepo {
    /// All override rows ordered by position.
    pub async fn list(pool: &PgPool) -> Result<Vec<SlideRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slides ORDER BY position ASC");
        sqlx::query_as::<_, SlideRow>(&query).fetch_all(pool).await
    }

    pub async fn find_by_position(
        pool: &PgPool,
        position: Position,
    ) -> Result<Option<SlideRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slides WHERE position = $1");
        sqlx::query_as::<_, SlideRow>(&query)
            .bind(position)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the title and document at `position`.
    ///
    /// With a revision, the update only applies when the stored revision is
    /// not newer, and the stored revision becomes the given one. Without a
    /// revision the stored one is bumped. Returns `None` when the write was
    /// stale and nothing changed.
    pub async fn upsert(
        pool: &PgPool,
        position: Position,
        dto: &UpsertSlide,
    ) -> Result<Option<SlideRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO slides (position, title, content, revision) \
             VALUES ($1, $2, $3, COALESCE($4::BIGINT, 1)) \
             ON CONFLICT (position) DO UPDATE SET \
                 title = EXCLUDED.title, \
                 content = EXCLUDED.content, \
                 revision = COALESCE($4::BIGINT, slides.revision + 1), \
                 updated_at = now() \
             WHERE $4::BIGINT IS NULL OR slides.revision <= $4::BIGINT \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SlideRow>(&query)
            .bind(position)
            .bind(&dto.title)
            .bind(&dto.content)
            .bind(dto.revision)
            .fetch_optional(pool)
            .await
    }

    /// Point the row at `position` to `image_url`.
    ///
    /// A missing row is created from `seed_title` / `seed_content` so the
    /// slide keeps rendering its default text. The revision is untouched.
    pub async fn set_image(
        pool: &PgPool,
        position: Position,
        seed_title: &str,
        seed_content: &serde_json::Value,
        image_url: &str,
    ) -> Result<SlideRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO slides (position, title, content, image_url) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (position) DO UPDATE SET \
                 image_url = EXCLUDED.image_url, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SlideRow>(&query)
            .bind(position)
            .bind(seed_title)
            .bind(seed_content)
            .bind(image_url)
            .fetch_one(pool)
            .await
    }

    /// Null the image reference at `position`.
    ///
    /// Returns the updated row and the URL it held, or `None` when no row
    /// exists.
    pub async fn clear_image(
        pool: &PgPool,
        position: Position,
    ) -> Result<Option<(SlideRow, Option<String>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT image_url FROM slides WHERE position = $1 FOR UPDATE")
                .bind(position)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((previous,)) = previous else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE slides SET image_url = NULL, updated_at = now() \
             WHERE position = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SlideRow>(&query)
            .bind(position)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((row, previous)))
    }
}
