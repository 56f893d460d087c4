use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::{ContentStore, ContentTx, StoreError};
use crate::content::model::{ContentItem, ContentKind, EditorFields, NewContent};

/// Production store backed by PostgreSQL. Maps 1:1 onto the
/// `content_items` table; a partial unique index on `(kind) WHERE
/// is_featured` backs the one-featured-per-kind invariant at the database
/// level.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn begin(&self) -> Result<Box<dyn ContentTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgContentTx { tx }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>("SELECT * FROM content_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>("SELECT * FROM content_items WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn list_admin(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE kind = $1 \
             ORDER BY published_at DESC NULLS LAST, updated_at DESC",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn list_published(
        &self,
        kind: ContentKind,
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE kind = $1 AND published \
             ORDER BY is_featured DESC, published_at DESC, id DESC LIMIT $2",
        )
        .bind(kind)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn recent_published(
        &self,
        exclude: &[i64],
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE published AND id <> ALL($1) \
             ORDER BY published_at DESC, id DESC LIMIT $2",
        )
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn featured(&self, kind: ContentKind) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE kind = $1 AND published AND is_featured LIMIT 1",
        )
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn latest_published(
        &self,
        kind: ContentKind,
    ) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE kind = $1 AND published \
             ORDER BY published_at DESC NULLS LAST, id DESC LIMIT 1",
        )
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn insert(&self, new: NewContent) -> Result<ContentItem, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(
            "INSERT INTO content_items (slug, title, kind) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&new.slug)
        .bind(&new.title)
        .bind(new.kind)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update_fields(
        &self,
        id: i64,
        fields: EditorFields,
    ) -> Result<ContentItem, StoreError> {
        sqlx::query_as::<_, ContentItem>(
            "UPDATE content_items SET \
                title = $2, slug = $3, excerpt = $4, author = $5, body = $6, \
                featured_image = $7, seo_title = $8, seo_description = $9, \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.excerpt)
        .bind(&fields.author)
        .bind(&fields.body)
        .bind(&fields.featured_image)
        .bind(&fields.seo_title)
        .bind(&fields.seo_description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

struct PgContentTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ContentTx for PgContentTx {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>("SELECT * FROM content_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(item)
    }

    async fn featured(&mut self, kind: ContentKind) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE kind = $1 AND published AND is_featured LIMIT 1",
        )
        .bind(kind)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(item)
    }

    async fn latest_published(
        &mut self,
        kind: ContentKind,
    ) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE kind = $1 AND published \
             ORDER BY published_at DESC NULLS LAST, id DESC LIMIT 1",
        )
        .bind(kind)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(item)
    }

    async fn mark_published(
        &mut self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<ContentItem, StoreError> {
        sqlx::query_as::<_, ContentItem>(
            "UPDATE content_items SET published = TRUE, published_at = $2, updated_at = $2 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn mark_unpublished(
        &mut self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<ContentItem, StoreError> {
        sqlx::query_as::<_, ContentItem>(
            "UPDATE content_items SET published = FALSE, is_featured = FALSE, updated_at = $2 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn set_featured_flag(
        &mut self,
        id: i64,
        featured: bool,
    ) -> Result<ContentItem, StoreError> {
        sqlx::query_as::<_, ContentItem>(
            "UPDATE content_items SET is_featured = $2, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(featured)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn clear_featured(&mut self, kind: ContentKind) -> Result<u64, StoreError> {
        let result =
            sqlx::query("UPDATE content_items SET is_featured = FALSE WHERE kind = $1 AND is_featured")
                .bind(kind)
                .execute(&mut *self.tx)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM content_items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
