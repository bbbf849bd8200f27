//! The storage seam used by the HTTP layer.
//!
//! [`PgSlideStore`] delegates to [`SlideRepo`]. [`MemorySlideStore`] keeps
//! rows in a map for deployments without a database and for tests; it
//! follows the same upsert and revision rules.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use pitchdeck_core::slide::SlideDocument;
use pitchdeck_core::types::{DbId, Position};
use tokio::sync::RwLock;

use crate::models::slide::{SlideRow, UpsertSlide};
use crate::repositories::SlideRepo;
use crate::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stale write to slide {position}: revision {attempted} is older than stored revision {stored}")]
    StaleRevision {
        position: Position,
        attempted: i64,
        stored: i64,
    },
}

/// Result of clearing an image reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearedImage {
    pub record: SlideRow,
    /// The URL that was cleared, if any.
    pub previous: Option<String>,
}

#[async_trait]
pub trait SlideStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    /// All override rows ordered by position.
    async fn list(&self) -> Result<Vec<SlideRow>, StoreError>;

    async fn upsert(&self, position: Position, dto: &UpsertSlide) -> Result<SlideRow, StoreError>;

    /// Set the image reference, creating the row from `seed` if needed.
    async fn attach_image(
        &self,
        position: Position,
        seed: &SlideDocument,
        image_url: &str,
    ) -> Result<SlideRow, StoreError>;

    /// Clear the image reference. `None` when no row exists at `position`.
    async fn clear_image(&self, position: Position) -> Result<Option<ClearedImage>, StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

pub struct PgSlideStore {
    pool: DbPool,
}

impl PgSlideStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SlideStore for PgSlideStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SlideRow>, StoreError> {
        Ok(SlideRepo::list(&self.pool).await?)
    }

    async fn upsert(&self, position: Position, dto: &UpsertSlide) -> Result<SlideRow, StoreError> {
        if let Some(row) = SlideRepo::upsert(&self.pool, position, dto).await? {
            return Ok(row);
        }
        let stored = SlideRepo::find_by_position(&self.pool, position)
            .await?
            .map(|row| row.revision)
            .unwrap_or_default();
        Err(StoreError::StaleRevision {
            position,
            attempted: dto.revision.unwrap_or_default(),
            stored,
        })
    }

    async fn attach_image(
        &self,
        position: Position,
        seed: &SlideDocument,
        image_url: &str,
    ) -> Result<SlideRow, StoreError> {
        let row = SlideRepo::set_image(&self.pool, position, seed.title(), &seed.to_value(), image_url)
            .await?;
        Ok(row)
    }

    async fn clear_image(&self, position: Position) -> Result<Option<ClearedImage>, StoreError> {
        let cleared = SlideRepo::clear_image(&self.pool, position).await?;
        Ok(cleared.map(|(record, previous)| ClearedImage { record, previous }))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-lifetime store keyed by position.
#[derive(Default)]
pub struct MemorySlideStore {
    rows: RwLock<BTreeMap<Position, SlideRow>>,
    next_id: AtomicI64,
}

impl MemorySlideStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl SlideStore for MemorySlideStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SlideRow>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn upsert(&self, position: Position, dto: &UpsertSlide) -> Result<SlideRow, StoreError> {
        let now = chrono::Utc::now();
        let mut rows = self.rows.write().await;

        if let Some(row) = rows.get_mut(&position) {
            let revision = match dto.revision {
                Some(attempted) if attempted < row.revision => {
                    return Err(StoreError::StaleRevision {
                        position,
                        attempted,
                        stored: row.revision,
                    });
                }
                Some(attempted) => attempted,
                None => row.revision + 1,
            };
            row.title = dto.title.clone();
            row.content = Some(dto.content.clone());
            row.revision = revision;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = SlideRow {
            id: self.allocate_id(),
            position,
            title: dto.title.clone(),
            content: Some(dto.content.clone()),
            image_url: None,
            revision: dto.revision.unwrap_or(1),
            created_at: now,
            updated_at: now,
        };
        rows.insert(position, row.clone());
        Ok(row)
    }

    async fn attach_image(
        &self,
        position: Position,
        seed: &SlideDocument,
        image_url: &str,
    ) -> Result<SlideRow, StoreError> {
        let now = chrono::Utc::now();
        let mut rows = self.rows.write().await;

        if let Some(row) = rows.get_mut(&position) {
            row.image_url = Some(image_url.to_string());
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = SlideRow {
            id: self.allocate_id(),
            position,
            title: seed.title().to_string(),
            content: Some(seed.to_value()),
            image_url: Some(image_url.to_string()),
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        rows.insert(position, row.clone());
        Ok(row)
    }

    async fn clear_image(&self, position: Position) -> Result<Option<ClearedImage>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&position) else {
            return Ok(None);
        };
        let previous = row.image_url.take();
        row.updated_at = chrono::Utc::now();
        Ok(Some(ClearedImage {
            record: row.clone(),
            previous,
        }))
    }
}
