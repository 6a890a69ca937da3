//! Callbacks that run once the host document has loaded.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

pub type LoadCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadPhase {
    Pending,
    /// Callbacks are running; registrations still join the queue.
    Draining,
    Loaded,
}

struct State {
    phase: LoadPhase,
    queue: VecDeque<LoadCallback>,
}

/// Ordered, append-only list of load callbacks.
///
/// [`fire_load`](Self::fire_load) pops callbacks one at a time and runs them
/// without holding the lock, so a callback may register further callbacks;
/// those run in the same drain, after everything queued before them. Once the
/// queue is empty the page counts as loaded and later registrations are
/// refused.
pub struct PageBootstrap {
    state: Mutex<State>,
}

impl Default for PageBootstrap {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                phase: LoadPhase::Pending,
                queue: VecDeque::new(),
            }),
        }
    }
}

impl PageBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `callback`. Returns `false`, dropping it, once the page has
    /// loaded.
    pub fn register_onload(&self, callback: impl FnOnce() + Send + 'static) -> bool {
        let mut state = self.lock();
        if state.phase == LoadPhase::Loaded {
            warn!("Load callback registered after the page loaded; ignoring");
            return false;
        }
        state.queue.push_back(Box::new(callback));
        true
    }

    /// Callbacks waiting for the load event.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().phase == LoadPhase::Loaded
    }

    /// Runs every queued callback in FIFO order; returns how many ran. Only
    /// the first call does anything, including calls made from a callback.
    pub fn fire_load(&self) -> usize {
        {
            let mut state = self.lock();
            if state.phase != LoadPhase::Pending {
                return 0;
            }
            state.phase = LoadPhase::Draining;
        }

        let mut count = 0;
        loop {
            let next = {
                let mut state = self.lock();
                match state.queue.pop_front() {
                    Some(callback) => callback,
                    None => {
                        state.phase = LoadPhase::Loaded;
                        break;
                    }
                }
            };
            next();
            count += 1;
        }
        debug!(count, "Load callbacks fired");
        count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
