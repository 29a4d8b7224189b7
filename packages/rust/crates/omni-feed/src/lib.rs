//! omni-feed - incremental window loading over a remote ordered collection.
//!
//! A render layer shows the first `limit` items of a collection and mounts a
//! load-more sentinel after them. When the sentinel enters the attention
//! region the limit grows by one step; the feed re-fetches with the new bound
//! and keeps the collection's total up to date in the background. Growth
//! stops once the limit reaches the known total and resumes if the total
//! grows upstream.
//!
//! # Architecture
//!
//! ```text
//! omni-feed/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # FeedError enum
//! ├── config.rs   # WindowConfig + YAML loading
//! ├── window.rs   # WindowController: pure growth policy
//! ├── trigger.rs  # Attention state machine, VisibilityTrigger, Sentinel
//! ├── shared.rs   # SharedWindow: serialized owner of the controller
//! ├── events.rs   # FeedEvent broadcast bus
//! ├── source.rs   # CollectionSource trait + InMemoryCollection
//! ├── feed.rs     # InfiniteFeed: fetch + count refresh runtime
//! └── simulate.rs # Scripted scroll session used by the CLI
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_feed::{InMemoryCollection, InfiniteFeed, WindowConfig};
//!
//! let feed = InfiniteFeed::new(InMemoryCollection::new((0..95).collect()), WindowConfig::default());
//! feed.load().await?;
//! let sentinel = feed.sentinel();
//! if sentinel.on_enter() {
//!     feed.load().await?;
//! }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod config;
mod error;
mod events;
mod feed;
mod shared;
mod simulate;
mod source;
mod trigger;
mod window;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use config::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_INITIAL_SIZE, DEFAULT_MARGIN_BOTTOM, DEFAULT_STEP_SIZE,
    WindowConfig, load_window_config,
};
pub use error::{FeedError, Result};
pub use events::{FeedEvent, FeedEventBus};
pub use feed::{FeedSnapshot, InfiniteFeed};
pub use shared::SharedWindow;
pub use simulate::{CycleReport, Simulation, SimulationOptions, SimulationReport, item_label};
pub use source::{CollectionSource, InMemoryCollection};
pub use trigger::{Attention, AttentionEdge, Sentinel, VisibilityTrigger};
pub use window::{RefreshOutcome, RefreshTicket, WindowController, WindowSnapshot};
