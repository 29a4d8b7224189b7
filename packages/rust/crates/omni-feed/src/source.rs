//! Collection collaborator: the remote ordered collection a feed windows over.
//!
//! The feed needs only two capabilities: a bounded top-N fetch and a count
//! filtered identically to that fetch. Ordering and item uniqueness are the
//! collection's responsibility.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{FeedError, Result};

/// Async access to an ordered collection.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Item type returned by fetches.
    type Item: Send;

    /// Fetch the first `limit` items in collection order.
    async fn fetch_window(&self, limit: usize) -> Result<Vec<Self::Item>>;

    /// Count all items matching the same filter as [`CollectionSource::fetch_window`].
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
impl<S> CollectionSource for Arc<S>
where
    S: CollectionSource + ?Sized,
{
    type Item = S::Item;

    async fn fetch_window(&self, limit: usize) -> Result<Vec<Self::Item>> {
        (**self).fetch_window(limit).await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}

#[derive(Debug)]
struct InMemoryState<T> {
    items: Vec<T>,
    fetch_failure: Option<String>,
    count_failure: Option<String>,
}

/// In-process collection. Clones share the same items, so a test or a
/// simulation can grow or shrink the collection "upstream" while a feed
/// windows over it.
#[derive(Debug)]
pub struct InMemoryCollection<T> {
    state: Arc<RwLock<InMemoryState<T>>>,
}

impl<T> Clone for InMemoryCollection<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> InMemoryCollection<T> {
    /// Create a collection holding `items` in order.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryState {
                items,
                fetch_failure: None,
                count_failure: None,
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one item.
    pub fn push(&self, item: T) {
        self.write().items.push(item);
    }

    /// Append several items.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        self.write().items.extend(items);
    }

    /// Drop everything past the first `len` items.
    pub fn truncate(&self, len: usize) {
        self.write().items.truncate(len);
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    /// Make subsequent fetches fail with `reason` (`None` restores them).
    pub fn fail_fetches(&self, reason: Option<&str>) {
        self.write().fetch_failure = reason.map(str::to_string);
    }

    /// Make subsequent counts fail with `reason` (`None` restores them).
    pub fn fail_counts(&self, reason: Option<&str>) {
        self.write().count_failure = reason.map(str::to_string);
    }
}

#[async_trait]
impl<T> CollectionSource for InMemoryCollection<T>
where
    T: Clone + Send + Sync,
{
    type Item = T;

    async fn fetch_window(&self, limit: usize) -> Result<Vec<T>> {
        let state = self.read();
        if let Some(reason) = &state.fetch_failure {
            return Err(FeedError::FetchFailed(reason.clone()));
        }
        Ok(state.items.iter().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        let state = self.read();
        if let Some(reason) = &state.count_failure {
            return Err(FeedError::CountUnavailable(reason.clone()));
        }
        Ok(state.items.len())
    }
}
