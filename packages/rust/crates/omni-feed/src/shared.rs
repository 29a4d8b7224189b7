//! Serialized owner of a [`WindowController`].
//!
//! Every mutation goes through one mutex so `reached_limit` always observes a
//! consistent `(limit, total)` pair. Events are published while the lock is
//! held so subscribers see them in mutation order. The lock is never held
//! across an await.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{FeedError, Result};
use crate::events::{FeedEvent, FeedEventBus};
use crate::trigger::VisibilityTrigger;
use crate::window::{RefreshOutcome, RefreshTicket, WindowController, WindowSnapshot};

pub(crate) struct WindowCell {
    window: Mutex<WindowController>,
    events: FeedEventBus,
    detached: AtomicBool,
}

impl WindowCell {
    fn lock(&self) -> MutexGuard<'_, WindowController> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Window guard, checked against `detached` while the guard is held.
    ///
    /// `detach` flips the flag under the same guard, so a mutation that gets
    /// the guard here finishes (and publishes) before teardown completes.
    fn lock_attached(&self) -> Result<MutexGuard<'_, WindowController>> {
        let window = self.lock();
        if self.is_detached() {
            return Err(FeedError::Detached);
        }
        Ok(window)
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    pub(crate) fn is_renderable(&self) -> bool {
        self.lock_attached()
            .is_ok_and(|window| window.should_render_more_control())
    }

    pub(crate) fn set_attentive(&self, attentive: bool) -> Result<bool> {
        let mut window = self.lock_attached()?;
        let grew = window.set_attentive(attentive);
        if grew {
            let limit = window.fetch_limit();
            tracing::debug!(limit, "sentinel entered attention region; limit grew");
            self.events.publish(FeedEvent::LimitGrew { limit });
        }
        Ok(grew)
    }

    fn grow(&self) -> Result<bool> {
        let mut window = self.lock_attached()?;
        let grew = window.grow();
        if grew {
            let limit = window.fetch_limit();
            tracing::debug!(limit, "limit grew");
            self.events.publish(FeedEvent::LimitGrew { limit });
        }
        Ok(grew)
    }

    fn report_fetched(&self, len: usize) -> Result<bool> {
        let mut window = self.lock_attached()?;
        let changed = window.report_fetched(len);
        if changed {
            self.events.publish(FeedEvent::WindowFetched { length: len });
        }
        Ok(changed)
    }

    fn begin_refresh(&self) -> Result<RefreshTicket> {
        Ok(self.lock_attached()?.begin_refresh())
    }

    fn apply_refresh(
        &self,
        ticket: RefreshTicket,
        result: Result<usize>,
    ) -> Result<RefreshOutcome> {
        let mut window = self.lock_attached()?;
        let error = match &result {
            Err(error) => Some(error.to_string()),
            Ok(_) => None,
        };
        let outcome = window.apply_refresh(ticket, result);
        match outcome {
            RefreshOutcome::Applied {
                total,
                reached_limit,
            } => {
                tracing::debug!(
                    seq = ticket.seq(),
                    total,
                    reached_limit,
                    "count refresh applied"
                );
                self.events.publish(FeedEvent::TotalRefreshed {
                    total,
                    reached_limit,
                });
            }
            RefreshOutcome::Stale => {
                tracing::debug!(seq = ticket.seq(), "discarding stale count refresh");
            }
            RefreshOutcome::Unavailable => {
                let error = error.unwrap_or_default();
                tracing::warn!(
                    seq = ticket.seq(),
                    error = %error,
                    "count unavailable; keeping last known total"
                );
                self.events.publish(FeedEvent::TotalUnavailable { error });
            }
        }
        Ok(outcome)
    }

    fn detach(&self) {
        let _window = self.lock();
        if !self.detached.swap(true, Ordering::AcqRel) {
            tracing::debug!("window detached");
            self.events.publish(FeedEvent::Detached);
        }
    }
}

/// Shared, thread-safe handle to one window.
///
/// Clones share the same state. After [`SharedWindow::detach`] every mutating
/// call returns [`FeedError::Detached`] and triggers become inert.
#[derive(Clone)]
pub struct SharedWindow {
    cell: Arc<WindowCell>,
}

impl SharedWindow {
    /// Wrap a controller, publishing changes on `events`.
    #[must_use]
    pub fn new(controller: WindowController, events: FeedEventBus) -> Self {
        Self {
            cell: Arc::new(WindowCell {
                window: Mutex::new(controller),
                events,
                detached: AtomicBool::new(false),
            }),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> WindowSnapshot {
        self.cell.lock().snapshot()
    }

    /// Limit for the next bounded fetch.
    #[must_use]
    pub fn fetch_limit(&self) -> usize {
        self.cell.lock().fetch_limit()
    }

    /// Whether the load-more control should stay mounted.
    #[must_use]
    pub fn should_render_more_control(&self) -> bool {
        self.cell.is_renderable()
    }

    /// See [`WindowController::set_attentive`].
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown.
    pub fn set_attentive(&self, attentive: bool) -> Result<bool> {
        self.cell.set_attentive(attentive)
    }

    /// See [`WindowController::grow`].
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown.
    pub fn grow(&self) -> Result<bool> {
        self.cell.grow()
    }

    /// See [`WindowController::report_fetched`].
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown.
    pub fn report_fetched(&self, len: usize) -> Result<bool> {
        self.cell.report_fetched(len)
    }

    /// See [`WindowController::begin_refresh`].
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown, so no new refresh is issued.
    pub fn begin_refresh(&self) -> Result<RefreshTicket> {
        self.cell.begin_refresh()
    }

    /// See [`WindowController::apply_refresh`].
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown; the result is dropped.
    pub fn apply_refresh(
        &self,
        ticket: RefreshTicket,
        result: Result<usize>,
    ) -> Result<RefreshOutcome> {
        self.cell.apply_refresh(ticket, result)
    }

    /// Set the total directly, superseding in-flight refreshes.
    ///
    /// # Errors
    /// [`FeedError::Detached`] after teardown.
    pub fn refresh_total(&self, total: usize) -> Result<RefreshOutcome> {
        let ticket = self.begin_refresh()?;
        self.apply_refresh(ticket, Ok(total))
    }

    /// Trigger handle for the sentinel's attention callbacks.
    #[must_use]
    pub fn trigger(&self) -> VisibilityTrigger {
        VisibilityTrigger::new(Arc::downgrade(&self.cell))
    }

    /// Event bus this window publishes to.
    #[must_use]
    pub fn events(&self) -> &FeedEventBus {
        &self.cell.events
    }

    /// Stop accepting mutations. Idempotent.
    ///
    /// Waits for a mutation already holding the window to finish; once this
    /// returns nothing else is applied or published.
    pub fn detach(&self) {
        self.cell.detach();
    }

    /// Whether [`SharedWindow::detach`] has been called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.cell.is_detached()
    }
}

impl std::fmt::Debug for SharedWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWindow")
            .field("window", &self.snapshot())
            .field("detached", &self.is_detached())
            .finish()
    }
}
