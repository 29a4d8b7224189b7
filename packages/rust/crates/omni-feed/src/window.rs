//! Window controller: the growth policy for an incrementally loaded window.
//!
//! Holds three separately updated quantities: the requested `limit`, the
//! remote `total` (unknown until the first count resolves) and the length of
//! the currently materialized window. `reached_limit` is always derived from
//! `(limit, total)` on read and is never stored.
//!
//! ```text
//! attention enter ──> grow()        limit += step   (unless reached)
//! fetch completes ──> report_fetched(len)
//! count resolves  ──> apply_refresh(ticket, total)  (stale tickets dropped)
//! ```

use serde::Serialize;

use crate::config::WindowConfig;
use crate::error::FeedError;
use crate::trigger::{Attention, AttentionEdge};

/// Token captured when a count refresh starts.
///
/// Tickets are ordered by start time; a result is applied only if no
/// later-started refresh has already been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[must_use]
pub struct RefreshTicket {
    seq: u64,
}

impl RefreshTicket {
    /// Start-order sequence number of this refresh.
    #[must_use]
    pub fn seq(self) -> u64 {
        self.seq
    }
}

/// Result of applying a count refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Total was updated.
    Applied {
        /// New total.
        total: usize,
        /// Derived flag after the update.
        reached_limit: bool,
    },
    /// A later-started refresh was already applied; result discarded.
    Stale,
    /// Count failed; last known total kept.
    Unavailable,
}

/// Point-in-time view of the window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSnapshot {
    /// Current requested window size.
    pub limit: usize,
    /// Growth per pulse.
    pub step_size: usize,
    /// Remote size at last count, if known.
    pub total: Option<usize>,
    /// Size of the most recent fetched window.
    pub fetched_len: usize,
    /// `total` is known and `limit >= total`.
    pub reached_limit: bool,
    /// Sentinel currently holds attention.
    pub attentive: bool,
    /// Whether the load-more sentinel should stay on the attention surface.
    pub has_more: bool,
}

/// Growth policy state machine. No I/O.
#[derive(Debug, Clone)]
pub struct WindowController {
    limit: usize,
    step_size: usize,
    total: Option<usize>,
    fetched_len: usize,
    attention: Attention,
    issued_refresh_seq: u64,
    applied_refresh_seq: u64,
}

impl WindowController {
    /// Create a controller with the given initial limit and step size.
    ///
    /// Both are clamped to at least 1. Total starts unknown, nothing fetched,
    /// sentinel idle.
    #[must_use]
    pub fn new(initial_limit: usize, step_size: usize) -> Self {
        Self {
            limit: initial_limit.max(1),
            step_size: step_size.max(1),
            total: None,
            fetched_len: 0,
            attention: Attention::Idle,
            issued_refresh_seq: 0,
            applied_refresh_seq: 0,
        }
    }

    /// Create a controller from config sizes.
    #[must_use]
    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.initial_size, config.step_size)
    }

    /// Limit to pass to the next bounded fetch.
    #[must_use]
    pub fn fetch_limit(&self) -> usize {
        self.limit
    }

    /// Growth per pulse.
    #[must_use]
    pub fn step_size(&self) -> usize {
        self.step_size
    }

    /// Remote total at last successful count, `None` while unknown.
    #[must_use]
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Length of the most recently reported window.
    #[must_use]
    pub fn fetched_len(&self) -> usize {
        self.fetched_len
    }

    /// Current sentinel state.
    #[must_use]
    pub fn attention(&self) -> Attention {
        self.attention
    }

    /// Whether the sentinel currently holds attention.
    #[must_use]
    pub fn is_attentive(&self) -> bool {
        self.attention.is_attentive()
    }

    /// `total` is known and the limit has caught up with it.
    #[must_use]
    pub fn reached_limit(&self) -> bool {
        self.total.is_some_and(|total| self.limit >= total)
    }

    /// Whether the load-more control should stay on the attention surface.
    ///
    /// False only when the limit has reached the total *and* the fetched
    /// window has caught up with it.
    #[must_use]
    pub fn should_render_more_control(&self) -> bool {
        match self.total {
            Some(total) => !self.reached_limit() || self.fetched_len < total,
            None => true,
        }
    }

    /// Record the size of the latest fetched window.
    ///
    /// Returns `true` when the length changed, which is the cue to re-issue a
    /// count refresh.
    pub fn report_fetched(&mut self, len: usize) -> bool {
        let changed = self.fetched_len != len;
        self.fetched_len = len;
        changed
    }

    /// Grow the limit by one step unless the limit has been reached.
    ///
    /// Returns `true` if the limit changed. Each call is one explicit pulse;
    /// attention-driven growth goes through [`WindowController::set_attentive`].
    pub fn grow(&mut self) -> bool {
        if self.reached_limit() {
            return false;
        }
        let next = self.limit.saturating_add(self.step_size);
        let grew = next != self.limit;
        self.limit = next;
        grew
    }

    /// Record sentinel visibility. An idle-to-attentive edge fires one growth
    /// pulse if growth is permitted; every other call only records state.
    ///
    /// Returns `true` if the limit grew.
    pub fn set_attentive(&mut self, attentive: bool) -> bool {
        let (next, edge) = self.attention.transition(attentive);
        self.attention = next;
        match edge {
            AttentionEdge::Entered => self.grow(),
            AttentionEdge::Left | AttentionEdge::Unchanged => false,
        }
    }

    /// Start a count refresh and capture its ordering token.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_refresh_seq += 1;
        RefreshTicket {
            seq: self.issued_refresh_seq,
        }
    }

    /// Apply the result of a count refresh started with `ticket`.
    ///
    /// A failed count keeps the last known total. A successful count is
    /// dropped if a refresh that started later has already been applied.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<usize, FeedError>,
    ) -> RefreshOutcome {
        let Ok(total) = result else {
            return RefreshOutcome::Unavailable;
        };
        if ticket.seq <= self.applied_refresh_seq {
            return RefreshOutcome::Stale;
        }
        self.applied_refresh_seq = ticket.seq;
        self.total = Some(total);
        RefreshOutcome::Applied {
            total,
            reached_limit: self.reached_limit(),
        }
    }

    /// Set the total directly, superseding any refresh still in flight.
    pub fn refresh_total(&mut self, total: usize) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        self.apply_refresh(ticket, Ok(total))
    }

    /// Capture the current state.
    #[must_use]
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            limit: self.limit,
            step_size: self.step_size,
            total: self.total,
            fetched_len: self.fetched_len,
            reached_limit: self.reached_limit(),
            attentive: self.is_attentive(),
            has_more: self.should_render_more_control(),
        }
    }
}

impl Default for WindowController {
    fn default() -> Self {
        Self::from_config(&WindowConfig::default())
    }
}
