//! Debounced execution
//!
//! Coalesces a burst of calls into one: each [`Debouncer::schedule`] cancels
//! the previously armed call and arms a new one, so only the last call of a
//! burst runs, once `delay` has passed without another call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::trace;
use tokio::task::JoinHandle;

/// Armed timer plus the generation it was armed for
struct Armed {
    generation: u64,
    handle: JoinHandle<()>,
}

/// One debouncer per logical input stream.
///
/// Cancellation is tracked by a generation counter: a timer only fires its
/// callback if no newer `schedule` or `cancel_pending` happened since it was
/// armed. The timer task is also aborted eagerly. Must be used from within a
/// tokio runtime.
#[derive(Default)]
pub struct Debouncer {
    generation: Arc<AtomicU64>,
    armed: Mutex<Option<Armed>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending call and run `callback` after `delay` of quiet
    pub fn schedule<F>(&self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut armed = self.armed.lock().unwrap_or_else(|e| e.into_inner());
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = armed.take() {
            trace!("Debounce: replacing generation {}", previous.generation);
            previous.handle.abort();
        }

        let current = Arc::clone(&self.generation);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                callback();
            }
        });

        *armed = Some(Armed { generation, handle });
    }

    /// Cancel the pending call without arming a replacement
    pub fn cancel_pending(&self) {
        let mut armed = self.armed.lock().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = armed.take() {
            previous.handle.abort();
        }
    }

    /// Whether a call is armed and has not fired yet
    pub fn is_pending(&self) -> bool {
        let armed = self.armed.lock().unwrap_or_else(|e| e.into_inner());
        armed.as_ref().is_some_and(|a| {
            !a.handle.is_finished() && a.generation == self.generation.load(Ordering::SeqCst)
        })
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
