//! Blocking hand-off queue between request producers and a worker thread.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

struct QueueState<T> {
    items: VecDeque<T>,
    active: bool,
}

/// Multi-producer, single-consumer queue with an explicit shutdown flag.
///
/// Producers never block. The consumer parks in [`RequestQueue::wait_for_items`]
/// until work arrives or the queue is deactivated, then takes everything at
/// once with [`RequestQueue::flush`]. Items pushed after deactivation are still
/// accepted so that a draining consumer sees them.
pub struct RequestQueue<T> {
    state: Mutex<QueueState<T>>,
    ready: Condvar,
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestQueue<T> {
    /// Creates an empty, active queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                active: true,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Appends an item and wakes the consumer.
    pub fn push(&self, item: T) {
        self.lock().items.push_back(item);
        self.ready.notify_one();
    }

    /// Blocks until items are queued or the queue is deactivated.
    ///
    /// Returns `true` while items remain, including after deactivation, and
    /// `false` once the queue is both inactive and empty.
    pub fn wait_for_items(&self) -> bool {
        let guard = self.lock();
        let state = self
            .ready
            .wait_while(guard, |state| state.items.is_empty() && state.active)
            .unwrap_or_else(|poison| poison.into_inner());
        !state.items.is_empty()
    }

    /// Removes and returns every queued item in push order.
    pub fn flush(&self) -> Vec<T> {
        self.lock().items.drain(..).collect()
    }

    /// Marks the queue inactive and wakes all waiters.
    pub fn deactivate(&self) {
        self.lock().active = false;
        self.ready.notify_all();
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether no items are queued.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Whether [`RequestQueue::deactivate`] has not yet been called.
    pub fn is_active(&self) -> bool {
        self.lock().active
    }
}
