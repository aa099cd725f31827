//! Throttled delayer for refresh/reveal bursts.
//!
//! A trigger waits out any execution in flight, then arms a delay window. A
//! newer trigger inside the window supersedes the armed one; every caller of
//! the window resolves once the single surviving task has finished. A running
//! task is never aborted.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Default)]
struct DelayerState {
    next_generation: u64,
    latest: u64,
    running: Option<u64>,
}

pub struct ThrottledDelayer {
    delay: Duration,
    state: Mutex<DelayerState>,
    done: watch::Sender<u64>,
}

impl ThrottledDelayer {
    pub fn new(delay: Duration) -> Self {
        let (done, _) = watch::channel(0);
        Self {
            delay,
            state: Mutex::new(DelayerState::default()),
            done,
        }
    }

    fn state(&self) -> MutexGuard<'_, DelayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while a trigger is armed or its task is running.
    pub fn is_triggered(&self) -> bool {
        let done = *self.done.borrow();
        let state = self.state();
        state.running.is_some() || state.latest > done
    }

    async fn wait_done(&self, generation: u64) {
        let mut rx = self.done.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|&done| done >= generation).await;
    }

    fn publish_done(&self, generation: u64) {
        self.done.send_modify(|done| *done = (*done).max(generation));
    }

    /// Schedules `task`; returns true if this call's task was the one that ran.
    pub async fn trigger<F, Fut>(&self, task: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let running = self.state().running;
        if let Some(generation) = running {
            self.wait_done(generation).await;
        }

        let generation = {
            let mut state = self.state();
            state.next_generation += 1;
            state.latest = state.next_generation;
            state.latest
        };
        let mut guard = TriggerGuard {
            delayer: self,
            generation,
            finished: false,
        };

        tokio::time::sleep(self.delay).await;

        let superseded = {
            let mut state = self.state();
            if state.latest != generation {
                true
            } else {
                state.running = Some(generation);
                false
            }
        };
        if superseded {
            guard.finished = true;
            tracing::trace!(generation, "trigger superseded");
            self.wait_done(generation).await;
            return false;
        }

        task().await;

        self.state().running = None;
        self.publish_done(generation);
        guard.finished = true;
        true
    }
}

/// Releases waiters if a trigger future is dropped before its task completes.
struct TriggerGuard<'a> {
    delayer: &'a ThrottledDelayer,
    generation: u64,
    finished: bool,
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let is_latest = {
            let mut state = self.delayer.state();
            if state.running == Some(self.generation) {
                state.running = None;
            }
            state.latest == self.generation
        };
        if is_latest {
            self.delayer.publish_done(self.generation);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/throttle.rs"]
mod tests;
