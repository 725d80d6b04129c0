//! Callback double collecting result batches.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Records every batch handed to callbacks created by [`BatchLog::callback`].
pub struct BatchLog<T> {
    batches: Mutex<Vec<Vec<T>>>,
    arrived: Condvar,
}

impl<T> BatchLog<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(Vec::new()),
            arrived: Condvar::new(),
        })
    }

    /// A fresh callback identity feeding this log.
    pub fn callback(self: &Arc<Self>) -> Arc<dyn Fn(Vec<T>) + Send + Sync> {
        let log = Arc::clone(self);
        Arc::new(move |batch| log.record(batch))
    }

    fn record(&self, batch: Vec<T>) {
        self.batches
            .lock()
            .expect("batch log mutex poisoned")
            .push(batch);
        self.arrived.notify_all();
    }

    /// Blocks until at least `count` items arrived, then returns them all.
    pub fn wait_for(&self, count: usize) -> Vec<T> {
        let guard = self.batches.lock().expect("batch log mutex poisoned");
        let (guard, timeout) = self
            .arrived
            .wait_timeout_while(guard, WAIT_LIMIT, |batches| {
                batches.iter().map(Vec::len).sum::<usize>() < count
            })
            .expect("batch log mutex poisoned during wait");
        assert!(
            !timeout.timed_out(),
            "timed out waiting for {count} results"
        );
        guard.iter().flatten().cloned().collect()
    }

    pub fn batches(&self) -> Vec<Vec<T>> {
        self.batches
            .lock()
            .expect("batch log mutex poisoned")
            .clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.batches().into_iter().flatten().collect()
    }
}
