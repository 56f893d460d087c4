use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{ContentStore, ContentTx, StoreError};
use crate::content::model::{ContentItem, ContentKind, EditorFields, NewContent};

/// In-memory store double. Transactions stage a copy of the whole
/// collection and swap it in on commit; the mutex is held for the lifetime
/// of the transaction, so units of work serialize the way the Postgres
/// store's do.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Shelf>>,
}

#[derive(Clone, Default)]
struct Shelf {
    items: Vec<ContentItem>,
    next_id: i64,
}

impl Shelf {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn get(&self, id: i64) -> Option<ContentItem> {
        self.items.iter().find(|i| i.id == id).cloned()
    }

    fn get_mut(&mut self, id: i64) -> Result<&mut ContentItem, StoreError> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound)
    }

    fn featured(&self, kind: ContentKind) -> Option<ContentItem> {
        self.items
            .iter()
            .find(|i| i.kind == kind && i.published && i.is_featured)
            .cloned()
    }

    fn latest_published(&self, kind: ContentKind) -> Option<ContentItem> {
        self.items
            .iter()
            .filter(|i| i.kind == kind && i.published)
            .max_by_key(|i| (i.published_at, i.id))
            .cloned()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test support: insert a fully formed item, assigning it the next id.
    pub async fn seed(&self, mut item: ContentItem) -> ContentItem {
        let mut shelf = self.inner.lock().await;
        item.id = shelf.allocate_id();
        shelf.items.push(item.clone());
        item
    }

    /// Test support: every item currently committed.
    pub async fn snapshot(&self) -> Vec<ContentItem> {
        self.inner.lock().await.items.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn ContentTx>, StoreError> {
        let guard = self.inner.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.inner.lock().await.get(id))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, StoreError> {
        let shelf = self.inner.lock().await;
        Ok(shelf.items.iter().find(|i| i.slug == slug).cloned())
    }

    async fn list_admin(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError> {
        let shelf = self.inner.lock().await;
        let mut items: Vec<ContentItem> = shelf
            .items
            .iter()
            .filter(|i| i.kind == kind)
            .cloned()
            .collect();
        // published_at desc with never-published items last, then updated_at desc
        items.sort_by(|a, b| match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => y.cmp(&x).then(b.updated_at.cmp(&a.updated_at)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.updated_at.cmp(&a.updated_at),
        });
        Ok(items)
    }

    async fn list_published(
        &self,
        kind: ContentKind,
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let shelf = self.inner.lock().await;
        let mut items: Vec<ContentItem> = shelf
            .items
            .iter()
            .filter(|i| i.kind == kind && i.published)
            .cloned()
            .collect();
        items.sort_by_key(|i| Reverse((i.is_featured, i.published_at, i.id)));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn recent_published(
        &self,
        exclude: &[i64],
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let shelf = self.inner.lock().await;
        let mut items: Vec<ContentItem> = shelf
            .items
            .iter()
            .filter(|i| i.published && !exclude.contains(&i.id))
            .cloned()
            .collect();
        items.sort_by_key(|i| Reverse((i.published_at, i.id)));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn featured(&self, kind: ContentKind) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.inner.lock().await.featured(kind))
    }

    async fn latest_published(
        &self,
        kind: ContentKind,
    ) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.inner.lock().await.latest_published(kind))
    }

    async fn insert(&self, new: NewContent) -> Result<ContentItem, StoreError> {
        let mut shelf = self.inner.lock().await;
        let now = Utc::now();
        let item = ContentItem {
            id: shelf.allocate_id(),
            slug: new.slug,
            title: new.title,
            excerpt: None,
            author: None,
            body: String::new(),
            featured_image: None,
            seo_title: None,
            seo_description: None,
            kind: new.kind,
            published: false,
            is_featured: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        shelf.items.push(item.clone());
        Ok(item)
    }

    async fn update_fields(
        &self,
        id: i64,
        fields: EditorFields,
    ) -> Result<ContentItem, StoreError> {
        let mut shelf = self.inner.lock().await;
        let item = shelf.get_mut(id)?;
        item.title = fields.title;
        item.slug = fields.slug;
        item.excerpt = fields.excerpt;
        item.author = fields.author;
        item.body = fields.body;
        item.featured_image = fields.featured_image;
        item.seo_title = fields.seo_title;
        item.seo_description = fields.seo_description;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Shelf>,
    staged: Shelf,
}

#[async_trait]
impl ContentTx for MemoryTx {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.staged.get(id))
    }

    async fn featured(&mut self, kind: ContentKind) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.staged.featured(kind))
    }

    async fn latest_published(
        &mut self,
        kind: ContentKind,
    ) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.staged.latest_published(kind))
    }

    async fn mark_published(
        &mut self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<ContentItem, StoreError> {
        let item = self.staged.get_mut(id)?;
        item.published = true;
        item.published_at = Some(at);
        item.updated_at = at;
        Ok(item.clone())
    }

    async fn mark_unpublished(
        &mut self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<ContentItem, StoreError> {
        let item = self.staged.get_mut(id)?;
        item.published = false;
        item.is_featured = false;
        item.updated_at = at;
        Ok(item.clone())
    }

    async fn set_featured_flag(
        &mut self,
        id: i64,
        featured: bool,
    ) -> Result<ContentItem, StoreError> {
        let item = self.staged.get_mut(id)?;
        item.is_featured = featured;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn clear_featured(&mut self, kind: ContentKind) -> Result<u64, StoreError> {
        let mut cleared = 0;
        for item in self
            .staged
            .items
            .iter_mut()
            .filter(|i| i.kind == kind && i.is_featured)
        {
            item.is_featured = false;
            cleared += 1;
        }
        Ok(cleared)
    }

    async fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.staged.items.len();
        self.staged.items.retain(|i| i.id != id);
        if self.staged.items.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        *self.guard = self.staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::NewContent;

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store
            .insert(NewContent::draft("First", ContentKind::Article))
            .await
            .unwrap();
        let b = store
            .insert(NewContent::draft("Second", ContentKind::Article))
            .await
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(!a.published);
        assert!(a.published_at.is_none());
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = MemoryStore::new();
        let item = store
            .insert(NewContent::draft("Draft", ContentKind::Recipe))
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.mark_published(item.id, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();

        let seen = store.find_by_id(item.id).await.unwrap().unwrap();
        assert!(seen.published);
        assert!(seen.published_at.is_some());
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let store = MemoryStore::new();
        let item = store
            .insert(NewContent::draft("Draft", ContentKind::Recipe))
            .await
            .unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.mark_published(item.id, Utc::now()).await.unwrap();
            tx.delete(item.id).await.unwrap();
            // no commit
        }

        let seen = store.find_by_id(item.id).await.unwrap().unwrap();
        assert!(!seen.published);
    }

    #[tokio::test]
    async fn update_fields_on_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_fields(99, EditorFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
