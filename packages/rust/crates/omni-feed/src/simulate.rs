//! Scripted scroll session over an in-memory collection.
//!
//! Each cycle fetches at the current limit, waits for count refreshes, then
//! scrolls the sentinel into view and back out. The session ends when the
//! sentinel unmounts or after `max_cycles`. Optionally the collection grows
//! upstream once the window first reaches `append_after` items.

use crate::config::WindowConfig;
use crate::error::Result;
use crate::feed::InfiniteFeed;
use crate::source::InMemoryCollection;
use crate::window::WindowSnapshot;

/// Shape of a simulated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Initial collection size.
    pub total: usize,
    /// Append once the fetched window holds at least this many items.
    pub append_after: Option<usize>,
    /// Number of items appended upstream.
    pub append: usize,
    /// Upper bound on fetch cycles.
    pub max_cycles: usize,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            total: 95,
            append_after: None,
            append: 0,
            max_cycles: 1000,
        }
    }
}

/// Window state at the end of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: usize,
    /// Window after the fetch and count refresh.
    pub window: WindowSnapshot,
}

/// Outcome of [`Simulation::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationReport {
    /// Fetch cycles executed.
    pub cycles: usize,
    /// Items in the last materialized window.
    pub items: usize,
    /// Whether the upstream append happened.
    pub appended: bool,
    /// Window state when the session ended.
    pub window: WindowSnapshot,
}

/// A feed over labelled in-memory items, driven by a scripted sentinel.
#[derive(Debug)]
pub struct Simulation {
    collection: InMemoryCollection<String>,
    feed: InfiniteFeed<String>,
    options: SimulationOptions,
}

impl Simulation {
    /// Build the collection and feed.
    ///
    /// # Errors
    /// [`crate::FeedError::InvalidConfig`] when a size in `config` is zero.
    pub fn new(config: WindowConfig, options: SimulationOptions) -> Result<Self> {
        config.validate()?;
        let collection = InMemoryCollection::new((0..options.total).map(item_label).collect());
        let feed = InfiniteFeed::new(collection.clone(), config);
        Ok(Self {
            collection,
            feed,
            options,
        })
    }

    /// The feed under simulation, e.g. to subscribe before [`Simulation::run`].
    #[must_use]
    pub fn feed(&self) -> &InfiniteFeed<String> {
        &self.feed
    }

    /// Run the session, calling `on_cycle` after every fetch cycle, then
    /// close the feed.
    ///
    /// # Errors
    /// Fetch or count errors from the collection stop the session.
    pub async fn run(&self, mut on_cycle: impl FnMut(&CycleReport)) -> Result<SimulationReport> {
        tracing::info!(
            total = self.options.total,
            initial_size = self.feed.config().initial_size,
            step_size = self.feed.config().step_size,
            "starting simulation"
        );
        let result = self.cycle(&mut on_cycle).await;
        self.feed.close();
        let report = result?;
        tracing::info!(
            cycles = report.cycles,
            items = report.items,
            "simulation finished"
        );
        Ok(report)
    }

    async fn cycle(&self, on_cycle: &mut impl FnMut(&CycleReport)) -> Result<SimulationReport> {
        let sentinel = self.feed.sentinel();
        let mut appended = false;
        let mut cycles = 0;
        while cycles < self.options.max_cycles {
            cycles += 1;
            let len = self.feed.load().await?;
            self.feed.settle().await;

            if let Some(after) = self.options.append_after
                && !appended
                && len >= after
            {
                let start = self.collection.len();
                self.collection
                    .extend((start..start + self.options.append).map(item_label));
                appended = true;
                tracing::info!(appended = self.options.append, "collection grew upstream");
                self.feed.refresh_total().await?;
            }

            on_cycle(&CycleReport {
                cycle: cycles,
                window: self.feed.snapshot().window,
            });

            if !sentinel.is_renderable() {
                break;
            }
            // Sentinel scrolls into view, then is pushed out by the new items.
            sentinel.on_enter();
            sentinel.on_leave();
        }
        Ok(SimulationReport {
            cycles,
            items: self.feed.items().len(),
            appended,
            window: self.feed.snapshot().window,
        })
    }
}

/// Label of the item at `index`.
#[must_use]
pub fn item_label(index: usize) -> String {
    format!("item-{index}")
}
