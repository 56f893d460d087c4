//! Storage abstraction for the content collection.
//!
//! The featured-content service and the request handlers never talk to the
//! database directly; they go through [`ContentStore`], and multi-step
//! mutations go through a [`ContentTx`] so the whole sequence commits or
//! rolls back as one unit. [`PgContentStore`] is the production
//! implementation; [`MemoryStore`] is the in-process double the service
//! tests run against.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgContentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::content::model::{ContentItem, ContentKind, EditorFields, NewContent};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Pool-level reads and writes, plus the entry point into a transaction.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Open a unit of work. Everything done through the returned handle is
    /// invisible to other callers until [`ContentTx::commit`].
    async fn begin(&self) -> Result<Box<dyn ContentTx>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ContentItem>, StoreError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, StoreError>;

    /// Admin listing for one kind, drafts included: most recently published
    /// first (never-published items last), then most recently edited.
    async fn list_admin(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError>;

    /// Published items of one kind: the featured item first, then latest
    /// published.
    async fn list_published(
        &self,
        kind: ContentKind,
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError>;

    /// Recent published items of either kind, excluding the given ids.
    async fn recent_published(
        &self,
        exclude: &[i64],
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError>;

    /// The published item of a kind currently holding the featured flag.
    async fn featured(&self, kind: ContentKind) -> Result<Option<ContentItem>, StoreError>;

    /// The most recently published item of a kind; ties on `published_at`
    /// break toward the highest id.
    async fn latest_published(&self, kind: ContentKind)
        -> Result<Option<ContentItem>, StoreError>;

    async fn insert(&self, new: NewContent) -> Result<ContentItem, StoreError>;
    async fn update_fields(
        &self,
        id: i64,
        fields: EditorFields,
    ) -> Result<ContentItem, StoreError>;
}

/// A transactional unit of work over the content collection. Dropping an
/// uncommitted transaction rolls every write back.
#[async_trait]
pub trait ContentTx: Send {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<ContentItem>, StoreError>;
    async fn featured(&mut self, kind: ContentKind) -> Result<Option<ContentItem>, StoreError>;
    async fn latest_published(
        &mut self,
        kind: ContentKind,
    ) -> Result<Option<ContentItem>, StoreError>;

    /// Mark an item published, stamping `published_at`.
    async fn mark_published(
        &mut self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<ContentItem, StoreError>;

    /// Mark an item unpublished and clear its featured flag. `published_at`
    /// keeps its old value.
    async fn mark_unpublished(
        &mut self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<ContentItem, StoreError>;

    async fn set_featured_flag(
        &mut self,
        id: i64,
        featured: bool,
    ) -> Result<ContentItem, StoreError>;

    /// Clear the featured flag on every item of a kind. Returns the number
    /// of rows that changed.
    async fn clear_featured(&mut self, kind: ContentKind) -> Result<u64, StoreError>;

    async fn delete(&mut self, id: i64) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
