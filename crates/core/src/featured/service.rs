//! Featured-content consistency service.
//!
//! Invariant, per content kind: among published items, at most one carries
//! the featured flag, and exactly one whenever any published item of that
//! kind exists. Publish, unpublish, set-featured and delete all run here so
//! the repair pass that restores the invariant commits in the same
//! transaction as the mutation that disturbed it.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::content::model::{ContentItem, ContentKind};
use crate::store::{ContentStore, ContentTx, StoreError};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content item {0} not found")]
    NotFound(i64),
    #[error("content item {0} is not published and cannot be featured")]
    NotPublished(i64),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub struct FeaturedService {
    store: Arc<dyn ContentStore>,
}

impl FeaturedService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Publish a draft, stamping `published_at`, then repair its kind (the
    /// first published item of a kind becomes its featured item).
    /// Publishing an item that is already live is a no-op.
    pub async fn publish(&self, id: i64) -> Result<ContentItem, ContentError> {
        let mut tx = self.store.begin().await?;
        let item = tx.find_by_id(id).await?.ok_or(ContentError::NotFound(id))?;
        if item.published {
            return Ok(item);
        }
        let updated = tx.mark_published(id, Utc::now()).await?;
        Self::repair_in(tx.as_mut(), updated.kind).await?;
        tx.commit().await?;
        tracing::debug!(id, kind = %updated.kind, "content item published");
        Ok(updated)
    }

    /// Unpublish a live item, clearing its featured flag (an unpublished
    /// item can never be featured), then repair its kind. `published_at`
    /// keeps its old value; a later re-publish stamps a fresh one.
    /// Unpublishing a draft is a no-op.
    pub async fn unpublish(&self, id: i64) -> Result<ContentItem, ContentError> {
        let mut tx = self.store.begin().await?;
        let item = tx.find_by_id(id).await?.ok_or(ContentError::NotFound(id))?;
        if !item.published {
            return Ok(item);
        }
        let updated = tx.mark_unpublished(id, Utc::now()).await?;
        Self::repair_in(tx.as_mut(), updated.kind).await?;
        tx.commit().await?;
        tracing::debug!(id, kind = %updated.kind, "content item unpublished");
        Ok(updated)
    }

    /// Make an item the featured one of its kind, demoting whichever item
    /// currently holds the flag. Both writes commit together. Featuring an
    /// unpublished item is rejected.
    pub async fn set_featured(&self, id: i64) -> Result<ContentItem, ContentError> {
        let mut tx = self.store.begin().await?;
        let item = tx.find_by_id(id).await?.ok_or(ContentError::NotFound(id))?;
        if !item.published {
            return Err(ContentError::NotPublished(id));
        }
        tx.clear_featured(item.kind).await?;
        let updated = tx.set_featured_flag(id, true).await?;
        tx.commit().await?;
        tracing::debug!(id, kind = %updated.kind, "content item featured");
        Ok(updated)
    }

    /// Remove an item entirely, then repair its kind; its featured flag, if
    /// set, disappears with it. Returns the deleted item.
    pub async fn delete(&self, id: i64) -> Result<ContentItem, ContentError> {
        let mut tx = self.store.begin().await?;
        let item = tx.find_by_id(id).await?.ok_or(ContentError::NotFound(id))?;
        tx.delete(id).await?;
        Self::repair_in(tx.as_mut(), item.kind).await?;
        tx.commit().await?;
        tracing::debug!(id, kind = %item.kind, "content item deleted");
        Ok(item)
    }

    /// Restore the invariant for one kind. Idempotent and safe to call when
    /// nothing is wrong. Returns the item left holding the featured flag,
    /// or `None` when the kind has no published items.
    pub async fn repair(&self, kind: ContentKind) -> Result<Option<ContentItem>, ContentError> {
        let mut tx = self.store.begin().await?;
        let repaired = Self::repair_in(tx.as_mut(), kind).await?;
        tx.commit().await?;
        Ok(repaired)
    }

    /// The repair pass proper, run inside the caller's transaction: if no
    /// published item of the kind is featured, promote the most recently
    /// published one (ties break toward the highest id).
    async fn repair_in(
        tx: &mut dyn ContentTx,
        kind: ContentKind,
    ) -> Result<Option<ContentItem>, ContentError> {
        if let Some(current) = tx.featured(kind).await? {
            return Ok(Some(current));
        }
        match tx.latest_published(kind).await? {
            Some(latest) => {
                let promoted = tx.set_featured_flag(latest.id, true).await?;
                tracing::info!(id = promoted.id, kind = %kind, "promoted item to featured");
                Ok(Some(promoted))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::content::model::ContentItem;
    use crate::store::MemoryStore;

    fn minute(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(n)
    }

    fn draft(kind: ContentKind) -> ContentItem {
        let t = minute(0);
        ContentItem {
            id: 0,
            slug: "some-slug".to_string(),
            title: "Some title".to_string(),
            excerpt: None,
            author: None,
            body: String::new(),
            featured_image: None,
            seo_title: None,
            seo_description: None,
            kind,
            published: false,
            is_featured: false,
            published_at: None,
            created_at: t,
            updated_at: t,
        }
    }

    fn live(kind: ContentKind, published_minute: i64) -> ContentItem {
        let mut item = draft(kind);
        item.published = true;
        item.published_at = Some(minute(published_minute));
        item
    }

    fn live_featured(kind: ContentKind, published_minute: i64) -> ContentItem {
        let mut item = live(kind, published_minute);
        item.is_featured = true;
        item
    }

    fn service(store: &Arc<MemoryStore>) -> FeaturedService {
        FeaturedService::new(store.clone())
    }

    async fn featured_ids(store: &MemoryStore, kind: ContentKind) -> Vec<i64> {
        store
            .snapshot()
            .await
            .iter()
            .filter(|i| i.kind == kind && i.published && i.is_featured)
            .map(|i| i.id)
            .collect()
    }

    #[tokio::test]
    async fn publish_stamps_published_at_and_features_first_item() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let item = store.seed(draft(ContentKind::Article)).await;

        let published = svc.publish(item.id).await.unwrap();

        assert!(published.published);
        assert!(published.published_at.is_some());
        // the only published article must end up featured
        assert_eq!(featured_ids(&store, ContentKind::Article).await, vec![item.id]);
    }

    #[tokio::test]
    async fn publish_does_not_steal_the_featured_flag() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let hero = store.seed(live_featured(ContentKind::Article, 1)).await;
        let newcomer = store.seed(draft(ContentKind::Article)).await;

        let published = svc.publish(newcomer.id).await.unwrap();

        assert!(!published.is_featured);
        assert_eq!(featured_ids(&store, ContentKind::Article).await, vec![hero.id]);
    }

    #[tokio::test]
    async fn publish_is_a_noop_when_already_live() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let item = store.seed(live_featured(ContentKind::Recipe, 5)).await;

        let again = svc.publish(item.id).await.unwrap();

        assert_eq!(again.published_at, Some(minute(5)));
        assert!(again.is_featured);
    }

    #[tokio::test]
    async fn publish_unknown_id_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        assert!(matches!(
            svc.publish(404).await,
            Err(ContentError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn set_featured_swaps_within_the_kind() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let old = store.seed(live_featured(ContentKind::Article, 1)).await;
        let new = store.seed(live(ContentKind::Article, 2)).await;

        let updated = svc.set_featured(new.id).await.unwrap();

        assert!(updated.is_featured);
        assert_eq!(featured_ids(&store, ContentKind::Article).await, vec![new.id]);
        let old_now = store.find_by_id(old.id).await.unwrap().unwrap();
        assert!(!old_now.is_featured);
    }

    #[tokio::test]
    async fn set_featured_rejects_unpublished_items() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let item = store.seed(draft(ContentKind::Recipe)).await;

        let err = svc.set_featured(item.id).await.unwrap_err();

        assert!(matches!(err, ContentError::NotPublished(id) if id == item.id));
        let unchanged = store.find_by_id(item.id).await.unwrap().unwrap();
        assert!(!unchanged.is_featured);
    }

    #[tokio::test]
    async fn set_featured_unknown_id_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        assert!(matches!(
            svc.set_featured(404).await,
            Err(ContentError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn unpublish_clears_flag_and_promotes_the_latest() {
        // A(t1), B(t2, featured), C(t3): unpublishing B must hand the flag
        // to C, the most recently published survivor.
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let a = store.seed(live(ContentKind::Article, 1)).await;
        let b = store.seed(live_featured(ContentKind::Article, 2)).await;
        let c = store.seed(live(ContentKind::Article, 3)).await;

        let updated = svc.unpublish(b.id).await.unwrap();

        assert!(!updated.published);
        assert!(!updated.is_featured);
        assert_eq!(featured_ids(&store, ContentKind::Article).await, vec![c.id]);
        let a_now = store.find_by_id(a.id).await.unwrap().unwrap();
        assert!(!a_now.is_featured);
    }

    #[tokio::test]
    async fn unpublish_keeps_published_at() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let item = store.seed(live_featured(ContentKind::Recipe, 7)).await;

        let updated = svc.unpublish(item.id).await.unwrap();

        assert_eq!(updated.published_at, Some(minute(7)));
    }

    #[tokio::test]
    async fn unpublish_last_item_leaves_kind_unfeatured() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let item = store.seed(live_featured(ContentKind::Recipe, 1)).await;

        svc.unpublish(item.id).await.unwrap();

        assert!(featured_ids(&store, ContentKind::Recipe).await.is_empty());
    }

    #[tokio::test]
    async fn unpublish_is_a_noop_on_drafts() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let item = store.seed(draft(ContentKind::Article)).await;

        let updated = svc.unpublish(item.id).await.unwrap();

        assert!(!updated.published);
        assert!(updated.published_at.is_none());
    }

    #[tokio::test]
    async fn delete_featured_item_promotes_the_next_latest() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let survivor = store.seed(live(ContentKind::Recipe, 1)).await;
        let doomed = store.seed(live_featured(ContentKind::Recipe, 2)).await;

        let deleted = svc.delete(doomed.id).await.unwrap();

        assert_eq!(deleted.id, doomed.id);
        assert!(store.find_by_id(doomed.id).await.unwrap().is_none());
        assert_eq!(
            featured_ids(&store, ContentKind::Recipe).await,
            vec![survivor.id]
        );
    }

    #[tokio::test]
    async fn delete_sole_published_item_leaves_kind_unfeatured() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let item = store.seed(live_featured(ContentKind::Recipe, 1)).await;

        svc.delete(item.id).await.unwrap();

        assert!(featured_ids(&store, ContentKind::Recipe).await.is_empty());
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        assert!(matches!(
            svc.delete(404).await,
            Err(ContentError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn kinds_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let article = store.seed(live_featured(ContentKind::Article, 1)).await;
        let recipe = store.seed(live_featured(ContentKind::Recipe, 1)).await;
        let spare_article = store.seed(live(ContentKind::Article, 2)).await;

        svc.unpublish(article.id).await.unwrap();

        // article repair promoted the spare; the recipe side never moved
        assert_eq!(
            featured_ids(&store, ContentKind::Article).await,
            vec![spare_article.id]
        );
        assert_eq!(
            featured_ids(&store, ContentKind::Recipe).await,
            vec![recipe.id]
        );
    }

    #[tokio::test]
    async fn repair_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        store.seed(live(ContentKind::Article, 1)).await;
        let latest = store.seed(live(ContentKind::Article, 2)).await;

        let first = svc.repair(ContentKind::Article).await.unwrap().unwrap();
        let second = svc.repair(ContentKind::Article).await.unwrap().unwrap();

        assert_eq!(first.id, latest.id);
        assert_eq!(second.id, latest.id);
        assert_eq!(featured_ids(&store, ContentKind::Article).await.len(), 1);
    }

    #[tokio::test]
    async fn repair_breaks_published_at_ties_toward_highest_id() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        store.seed(live(ContentKind::Recipe, 3)).await;
        let younger_twin = store.seed(live(ContentKind::Recipe, 3)).await;

        let promoted = svc.repair(ContentKind::Recipe).await.unwrap().unwrap();

        assert_eq!(promoted.id, younger_twin.id);
    }

    #[tokio::test]
    async fn repair_prefers_latest_published_over_highest_id() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let late = store.seed(live(ContentKind::Recipe, 9)).await;
        store.seed(live(ContentKind::Recipe, 2)).await;

        let promoted = svc.repair(ContentKind::Recipe).await.unwrap().unwrap();

        assert_eq!(promoted.id, late.id);
    }

    #[tokio::test]
    async fn repair_on_empty_kind_is_a_noop() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        store.seed(live_featured(ContentKind::Article, 1)).await;

        let repaired = svc.repair(ContentKind::Recipe).await.unwrap();

        assert!(repaired.is_none());
    }

    /// The invariant must hold after every operation in a mixed sequence:
    /// per kind, at most one published item is featured, and exactly one
    /// whenever the kind has any published item.
    #[tokio::test]
    async fn invariant_holds_across_a_mixed_sequence() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let a1 = store.seed(draft(ContentKind::Article)).await;
        let a2 = store.seed(draft(ContentKind::Article)).await;
        let a3 = store.seed(draft(ContentKind::Article)).await;
        let r1 = store.seed(draft(ContentKind::Recipe)).await;
        let r2 = store.seed(draft(ContentKind::Recipe)).await;

        async fn check(store: &MemoryStore) {
            for kind in [ContentKind::Article, ContentKind::Recipe] {
                let snapshot = store.snapshot().await;
                let published = snapshot
                    .iter()
                    .filter(|i| i.kind == kind && i.published)
                    .count();
                let featured = snapshot
                    .iter()
                    .filter(|i| i.kind == kind && i.published && i.is_featured)
                    .count();
                assert!(featured <= 1, "{kind}: more than one featured item");
                if published > 0 {
                    assert_eq!(featured, 1, "{kind}: published items but none featured");
                }
            }
        }

        svc.publish(a1.id).await.unwrap();
        check(&store).await;
        svc.publish(a2.id).await.unwrap();
        check(&store).await;
        svc.publish(r1.id).await.unwrap();
        check(&store).await;
        svc.set_featured(a2.id).await.unwrap();
        check(&store).await;
        svc.publish(a3.id).await.unwrap();
        check(&store).await;
        svc.unpublish(a2.id).await.unwrap();
        check(&store).await;
        svc.publish(r2.id).await.unwrap();
        check(&store).await;
        svc.set_featured(r2.id).await.unwrap();
        check(&store).await;
        svc.delete(a3.id).await.unwrap();
        check(&store).await;
        svc.delete(r2.id).await.unwrap();
        check(&store).await;
        svc.unpublish(a1.id).await.unwrap();
        check(&store).await;
    }
}
