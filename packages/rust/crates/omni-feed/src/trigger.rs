//! Sentinel attention state machine and the trigger handle handed to the
//! render layer.
//!
//! ```text
//!   Idle ──enter──> Attentive ──leave──> Idle
//! ```
//!
//! The trigger only sees boolean edge events, never geometry. It holds a
//! weak reference to its window, so once the owner is torn down every
//! callback becomes a no-op and the sentinel reports itself unrenderable.

use std::sync::Weak;

use serde::{Deserialize, Serialize};

use crate::shared::WindowCell;

/// Whether the sentinel region currently holds attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attention {
    /// Sentinel out of the attention region.
    #[default]
    Idle,
    /// Sentinel inside the attention region.
    Attentive,
}

/// Edge produced by one visibility report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionEdge {
    /// Idle to attentive. Fires a growth pulse.
    Entered,
    /// Attentive to idle.
    Left,
    /// Redundant report.
    Unchanged,
}

impl Attention {
    /// Apply a visibility report.
    #[must_use]
    pub fn transition(self, visible: bool) -> (Self, AttentionEdge) {
        match (self, visible) {
            (Self::Idle, true) => (Self::Attentive, AttentionEdge::Entered),
            (Self::Attentive, false) => (Self::Idle, AttentionEdge::Left),
            (state, _) => (state, AttentionEdge::Unchanged),
        }
    }

    /// `true` for [`Attention::Attentive`].
    #[must_use]
    pub fn is_attentive(self) -> bool {
        matches!(self, Self::Attentive)
    }
}

/// Handle the render layer wires to the sentinel's enter/leave callbacks.
#[derive(Debug, Clone)]
pub struct VisibilityTrigger {
    cell: Weak<WindowCell>,
}

impl VisibilityTrigger {
    pub(crate) fn new(cell: Weak<WindowCell>) -> Self {
        Self { cell }
    }

    /// Sentinel entered the attention region. Returns `true` if the limit grew.
    pub fn on_enter_attention_region(&self) -> bool {
        self.cell
            .upgrade()
            .is_some_and(|cell| cell.set_attentive(true).unwrap_or(false))
    }

    /// Sentinel left the attention region.
    pub fn on_leave_attention_region(&self) {
        if let Some(cell) = self.cell.upgrade() {
            let _ = cell.set_attentive(false);
        }
    }

    /// Whether the sentinel should stay on the attention surface.
    ///
    /// When this is false the sentinel must be removed, not just hidden, so it
    /// cannot fire again.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.cell
            .upgrade()
            .is_some_and(|cell| cell.is_renderable())
    }

    /// Whether the trigger is still attached to a live window.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.cell
            .upgrade()
            .is_some_and(|cell| !cell.is_detached())
    }
}

/// Everything a render layer needs to draw the load-more sentinel.
#[derive(Debug, Clone)]
pub struct Sentinel {
    /// Whether to mount the sentinel at all, captured at creation.
    pub renderable: bool,
    /// Extra space below the viewport that still counts as in view.
    pub margin_bottom: u32,
    trigger: VisibilityTrigger,
}

impl Sentinel {
    pub(crate) fn new(trigger: VisibilityTrigger, margin_bottom: u32) -> Self {
        Self {
            renderable: trigger.is_renderable(),
            margin_bottom,
            trigger,
        }
    }

    /// Enter callback.
    pub fn on_enter(&self) -> bool {
        self.trigger.on_enter_attention_region()
    }

    /// Leave callback.
    pub fn on_leave(&self) {
        self.trigger.on_leave_attention_region();
    }

    /// Live renderability (may differ from the captured flag).
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.trigger.is_renderable()
    }

    /// Underlying trigger.
    #[must_use]
    pub fn trigger(&self) -> &VisibilityTrigger {
        &self.trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_leave_are_the_only_transitions() {
        let (state, edge) = Attention::Idle.transition(true);
        assert_eq!(state, Attention::Attentive);
        assert_eq!(edge, AttentionEdge::Entered);

        let (state, edge) = state.transition(false);
        assert_eq!(state, Attention::Idle);
        assert_eq!(edge, AttentionEdge::Left);
    }

    #[test]
    fn redundant_reports_are_unchanged() {
        assert_eq!(
            Attention::Attentive.transition(true),
            (Attention::Attentive, AttentionEdge::Unchanged)
        );
        assert_eq!(
            Attention::Idle.transition(false),
            (Attention::Idle, AttentionEdge::Unchanged)
        );
    }

    #[test]
    fn dangling_trigger_is_inert() {
        let trigger = VisibilityTrigger::new(Weak::new());
        assert!(!trigger.on_enter_attention_region());
        trigger.on_leave_attention_region();
        assert!(!trigger.is_renderable());
        assert!(!trigger.is_attached());
    }
}
