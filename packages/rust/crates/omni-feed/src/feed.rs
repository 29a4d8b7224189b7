//! Feed runtime: a window controller wired to a collection.
//!
//! The feed issues bounded fetches, keeps the latest materialized window, and
//! schedules a count refresh whenever the window length changes. Count
//! refreshes run as background tasks and never block growth decisions.
//!
//! ```text
//! Sentinel enter ──> SharedWindow::set_attentive ──> LimitGrew event
//!                                                        │
//!            InfiniteFeed::load(limit) <─────────────────┘
//!                   │
//!                   ├─ report_fetched(len) ── changed? ──> spawn count refresh
//!                   └─ items replaced                         │
//!                                      apply_refresh(ticket) <┘
//! ```

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinHandle, JoinSet};

use crate::config::WindowConfig;
use crate::error::{FeedError, Result};
use crate::events::{FeedEvent, FeedEventBus};
use crate::shared::SharedWindow;
use crate::source::CollectionSource;
use crate::trigger::{Sentinel, VisibilityTrigger};
use crate::window::{RefreshOutcome, WindowController, WindowSnapshot};

/// What the render layer sees after a fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot<T> {
    /// Latest materialized window, in collection order.
    pub items: Vec<T>,
    /// A fetch is in flight.
    pub loading: bool,
    /// Window state at the time of the snapshot.
    pub window: WindowSnapshot,
}

impl<T> FeedSnapshot<T> {
    /// Whether the load-more sentinel should stay mounted.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.window.has_more
    }
}

#[derive(Debug)]
struct Materialized<T> {
    items: Vec<T>,
    in_flight: usize,
    issued_fetch_seq: u64,
    applied_fetch_seq: u64,
}

/// Counts one fetch as in flight until dropped, including when the `load`
/// future holding it is cancelled.
struct InFlightFetch<'a, T> {
    materialized: &'a RwLock<Materialized<T>>,
}

impl<'a, T> InFlightFetch<'a, T> {
    fn enter(lock: &'a RwLock<Materialized<T>>, materialized: &mut Materialized<T>) -> Self {
        materialized.in_flight += 1;
        Self { materialized: lock }
    }
}

impl<T> Drop for InFlightFetch<'_, T> {
    fn drop(&mut self) {
        let mut materialized = self
            .materialized
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        materialized.in_flight = materialized.in_flight.saturating_sub(1);
    }
}

/// Incrementally loaded view over a [`CollectionSource`].
pub struct InfiniteFeed<T> {
    source: Arc<dyn CollectionSource<Item = T>>,
    window: SharedWindow,
    config: WindowConfig,
    materialized: RwLock<Materialized<T>>,
    refreshes: Mutex<JoinSet<()>>,
}

impl<T> InfiniteFeed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Build a feed over `source`. Sizes in `config` are clamped to at least 1.
    #[must_use]
    pub fn new<S>(source: S, config: WindowConfig) -> Self
    where
        S: CollectionSource<Item = T> + 'static,
    {
        let config = config.normalized();
        let events = FeedEventBus::new(config.event_capacity);
        let window = SharedWindow::new(WindowController::from_config(&config), events);
        Self {
            source: Arc::new(source),
            window,
            config,
            materialized: RwLock::new(Materialized {
                items: Vec::new(),
                in_flight: 0,
                issued_fetch_seq: 0,
                applied_fetch_seq: 0,
            }),
            refreshes: Mutex::new(JoinSet::new()),
        }
    }

    fn read_materialized(&self) -> RwLockReadGuard<'_, Materialized<T>> {
        self.materialized
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_materialized(&self) -> RwLockWriteGuard<'_, Materialized<T>> {
        self.materialized
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_refreshes(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.refreshes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Shared window handle.
    #[must_use]
    pub fn window(&self) -> &SharedWindow {
        &self.window
    }

    /// Limit for the next fetch.
    #[must_use]
    pub fn fetch_limit(&self) -> usize {
        self.window.fetch_limit()
    }

    /// Trigger to wire into the sentinel's attention callbacks.
    #[must_use]
    pub fn trigger(&self) -> VisibilityTrigger {
        self.window.trigger()
    }

    /// Sentinel descriptor for the render layer.
    #[must_use]
    pub fn sentinel(&self) -> Sentinel {
        Sentinel::new(self.window.trigger(), self.config.margin_bottom)
    }

    /// Subscribe to window change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.window.events().subscribe()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_materialized().in_flight > 0
    }

    /// Whether the load-more sentinel should stay mounted.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.window.should_render_more_control()
    }

    /// Copy of the latest materialized window.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.read_materialized().items.clone()
    }

    /// Items, loading flag and window state together.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot<T> {
        let (items, loading) = {
            let materialized = self.read_materialized();
            (materialized.items.clone(), materialized.in_flight > 0)
        };
        FeedSnapshot {
            items,
            loading,
            window: self.window.snapshot(),
        }
    }

    /// Explicitly poll for one growth pulse, outside of sentinel attention.
    ///
    /// # Errors
    /// [`FeedError::Detached`] after [`InfiniteFeed::close`].
    pub fn grow(&self) -> Result<bool> {
        self.window.grow()
    }

    /// Fetch the window at the current limit and record its length.
    ///
    /// A length change schedules a background count refresh. If a fetch that
    /// started later has already landed, this result is dropped and the
    /// current length is returned, whether it succeeded or not. On failure the
    /// window is left as it was so a retry reuses the same limit. Dropping the
    /// returned future mid-fetch clears its share of the loading flag.
    ///
    /// # Errors
    /// [`FeedError::FetchFailed`] (or whatever the collection returned) when
    /// the fetch fails, [`FeedError::Detached`] after teardown.
    pub async fn load(&self) -> Result<usize> {
        if self.window.is_detached() {
            return Err(FeedError::Detached);
        }
        let limit = self.window.fetch_limit();
        let (seq, in_flight) = {
            let mut materialized = self.write_materialized();
            materialized.issued_fetch_seq += 1;
            (
                materialized.issued_fetch_seq,
                InFlightFetch::enter(&self.materialized, &mut materialized),
            )
        };

        let fetched = self.source.fetch_window(limit).await;
        drop(in_flight);

        let mut materialized = self.write_materialized();
        if seq <= materialized.applied_fetch_seq {
            tracing::debug!(
                seq,
                limit,
                failed = fetched.is_err(),
                "discarding stale fetch"
            );
            return Ok(materialized.items.len());
        }
        let items = match fetched {
            Ok(items) => items,
            Err(error) => {
                drop(materialized);
                tracing::warn!(limit, error = %error, "fetch failed; window unchanged");
                self.window.events().publish(FeedEvent::FetchFailed {
                    error: error.to_string(),
                });
                return Err(error);
            }
        };

        let len = items.len();
        let changed = self.window.report_fetched(len)?;
        materialized.applied_fetch_seq = seq;
        materialized.items = items;
        drop(materialized);

        tracing::debug!(limit, len, changed, "window fetched");
        if changed {
            self.refresh_total_now()?;
        }
        Ok(len)
    }

    /// Start a background count refresh and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown; no refresh is issued.
    pub fn refresh_total_now(&self) -> Result<()> {
        let ticket = self.window.begin_refresh()?;
        let source = Arc::clone(&self.source);
        let window = self.window.clone();

        let mut refreshes = self.lock_refreshes();
        while let Some(result) = refreshes.try_join_next() {
            if let Err(error) = result
                && !error.is_cancelled()
            {
                tracing::error!("count refresh task crashed: {error}");
            }
        }
        refreshes.spawn(async move {
            let result = source.count().await;
            // Detached windows reject the result; nothing left to update.
            let _ = window.apply_refresh(ticket, result);
        });
        Ok(())
    }

    /// Run a count refresh and wait for its outcome.
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown.
    pub async fn refresh_total(&self) -> Result<RefreshOutcome> {
        let ticket = self.window.begin_refresh()?;
        let result = self.source.count().await;
        self.window.apply_refresh(ticket, result)
    }

    /// Wait for every background count refresh started so far.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.lock_refreshes());
        while let Some(result) = pending.join_next().await {
            if let Err(error) = result
                && !error.is_cancelled()
            {
                tracing::error!("count refresh task crashed: {error}");
            }
        }
    }

    /// Tear down: detach the window (triggers go inert, no new refreshes)
    /// and abort refreshes still in flight. Idempotent.
    pub fn close(&self) {
        self.window.detach();
        self.lock_refreshes().abort_all();
    }

    /// Whether [`InfiniteFeed::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.window.is_detached()
    }

    /// Re-fetch automatically every time the limit grows.
    ///
    /// The task holds only a weak reference, so it ends when the feed is
    /// closed or dropped.
    #[must_use]
    pub fn spawn_autoload(self: &Arc<Self>) -> JoinHandle<()> {
        let feed = Arc::downgrade(self);
        let events = self.subscribe();
        tokio::spawn(autoload_loop(feed, events))
    }
}

async fn autoload_loop<T>(
    feed: Weak<InfiniteFeed<T>>,
    mut events: broadcast::Receiver<FeedEvent>,
) where
    T: Clone + Send + Sync + 'static,
{
    loop {
        match events.recv().await {
            Ok(FeedEvent::LimitGrew { .. }) | Err(RecvError::Lagged(_)) => {}
            Ok(FeedEvent::Detached) | Err(RecvError::Closed) => break,
            Ok(_) => continue,
        }
        let Some(feed) = feed.upgrade() else {
            break;
        };
        match feed.load().await {
            Ok(_) => {}
            Err(FeedError::Detached) => break,
            Err(error) => {
                tracing::debug!(error = %error, "autoload fetch failed; waiting for next growth");
            }
        }
    }
}

impl<T> Drop for InfiniteFeed<T> {
    fn drop(&mut self) {
        self.window.detach();
        self.refreshes
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .abort_all();
    }
}

impl<T> std::fmt::Debug for InfiniteFeed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfiniteFeed")
            .field("window", &self.window)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
