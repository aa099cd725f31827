//! Click coalescing for tree rows.
//!
//! Consecutive clicks inside the window count as one gesture; the gesture is
//! only resolved once the window elapses, so the host has to poll with the
//! current time.

use crate::models::{NodeId, NodeKind};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickGesture {
    pub node: NodeId,
    pub kind: NodeKind,
    pub clicks: u32,
}

#[derive(Debug)]
pub(crate) struct ClickTracker {
    window: Duration,
    clicks: u32,
    pending: Option<(NodeId, NodeKind, Instant)>,
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            clicks: 0,
            pending: None,
        }
    }

    /// Registers a click and restarts the window, superseding any pending deadline.
    ///
    /// A click on another node, or one after the window ran out unpolled, starts
    /// a new gesture.
    pub fn click(&mut self, node: NodeId, kind: NodeKind, now: Instant) {
        let continues = self
            .pending
            .is_some_and(|(last, _, deadline)| last == node && now < deadline);
        if !continues {
            self.clicks = 0;
        }
        self.clicks += 1;
        self.pending = Some((node, kind, now + self.window));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, _, deadline)| deadline)
    }

    /// Resolves the gesture once its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ClickGesture> {
        let (node, kind, deadline) = self.pending?;
        if now < deadline {
            return None;
        }
        let clicks = self.clicks;
        self.pending = None;
        self.clicks = 0;
        Some(ClickGesture { node, kind, clicks })
    }
}
