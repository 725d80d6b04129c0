//! Worker threads that resolve queued host requests in batches.
//!
//! A [`RequestDispatcher`] owns one [`RequestQueue`] and one named worker
//! thread. Each time the worker wakes it takes every queued request, resolves
//! them in push order and hands the results back grouped by callback, so a host
//! call that submitted many requests with one callback receives one batch.

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::queue::RequestQueue;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Callback receiving one batch of results.
pub type ResultCallback<O> = Arc<dyn Fn(Vec<O>) + Send + Sync>;

/// Turns one request into its result.
///
/// Implementations report per-request failures inside `O`; a failure never
/// aborts the rest of the batch.
pub trait Resolve<R, O>: Send + Sync {
    /// Resolves a single request.
    fn resolve(&self, request: R) -> O;
}

impl<R, O, T> Resolve<R, O> for Arc<T>
where
    T: Resolve<R, O> + ?Sized,
{
    fn resolve(&self, request: R) -> O {
        (**self).resolve(request)
    }
}

/// Which host operation a dispatcher serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    /// Property reads.
    Get,
    /// Property writes.
    Set,
}

impl DispatchKind {
    const fn thread_name(self) -> &'static str {
        match self {
            Self::Get => "vhal-get",
            Self::Set => "vhal-set",
        }
    }
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Get => "get",
            Self::Set => "set",
        })
    }
}

/// Errors raised while starting or stopping a dispatcher.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn {kind} dispatcher thread: {source}")]
    Spawn {
        /// Dispatcher that failed to start.
        kind: DispatchKind,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// The worker thread panicked.
    #[error("{kind} dispatcher thread panicked")]
    ThreadPanic {
        /// Dispatcher whose worker panicked.
        kind: DispatchKind,
    },
}

/// A queued request together with the callback awaiting its result.
pub struct PendingRequest<R, O> {
    request: R,
    callback: ResultCallback<O>,
}

/// Batching worker for one request kind.
pub struct RequestDispatcher<R, O> {
    kind: DispatchKind,
    queue: Arc<RequestQueue<PendingRequest<R, O>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl<R, O> RequestDispatcher<R, O>
where
    R: Send + 'static,
    O: Send + 'static,
{
    /// Starts the worker thread for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::Spawn`] when the thread cannot be created.
    pub fn spawn<V>(kind: DispatchKind, resolver: V) -> Result<Self, DispatcherError>
    where
        V: Resolve<R, O> + 'static,
    {
        let queue = Arc::new(RequestQueue::new());
        let worker_queue = Arc::clone(&queue);
        let handle = thread::Builder::new()
            .name(kind.thread_name().to_owned())
            .spawn(move || run_worker(kind, &worker_queue, &resolver))
            .map_err(|source| DispatcherError::Spawn { kind, source })?;
        debug!(target: DISPATCH_TARGET, %kind, "dispatcher started");
        Ok(Self {
            kind,
            queue,
            worker: Mutex::new(Some(handle)),
            stopped: AtomicBool::new(false),
        })
    }

    /// Queues `request`; `callback` later receives its result in a batch.
    ///
    /// Never blocks on resolution. Must not be called after
    /// [`RequestDispatcher::stop`].
    pub fn add_request(&self, request: R, callback: ResultCallback<O>) {
        debug_assert!(
            !self.stopped.load(Ordering::Acquire),
            "{} request added after the dispatcher stopped",
            self.kind
        );
        self.queue.push(PendingRequest { request, callback });
    }

    /// Requests queued but not yet taken by the worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Which request kind this dispatcher serves.
    pub const fn kind(&self) -> DispatchKind {
        self.kind
    }

    /// Drains outstanding requests and joins the worker.
    ///
    /// Every request accepted before this call is resolved and delivered.
    /// Repeated calls return immediately.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::ThreadPanic`] if the worker panicked.
    pub fn stop(&self) -> Result<(), DispatcherError> {
        self.stopped.store(true, Ordering::Release);
        self.queue.deactivate();
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .take();
        let Some(handle) = handle else {
            return Ok(());
        };
        let kind = self.kind;
        handle
            .join()
            .map_err(|_| DispatcherError::ThreadPanic { kind })?;
        info!(target: DISPATCH_TARGET, %kind, "dispatcher stopped");
        Ok(())
    }
}

impl<R, O> Drop for RequestDispatcher<R, O> {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.queue.deactivate();
        let handle = self
            .worker
            .get_mut()
            .unwrap_or_else(|poison| poison.into_inner())
            .take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            warn!(
                target: DISPATCH_TARGET,
                kind = %self.kind,
                "dispatcher thread panicked before shutdown"
            );
        }
    }
}

fn run_worker<R, O, V>(kind: DispatchKind, queue: &RequestQueue<PendingRequest<R, O>>, resolver: &V)
where
    V: Resolve<R, O>,
{
    while queue.wait_for_items() {
        let batch = queue.flush();
        let requests = batch.len();
        let groups = resolve_batch(resolver, batch);
        debug!(
            target: DISPATCH_TARGET,
            %kind,
            requests,
            callbacks = groups.len(),
            "resolved batch"
        );
        for (callback, results) in groups {
            deliver(kind, &callback, results);
        }
    }
    debug!(target: DISPATCH_TARGET, %kind, "dispatcher queue drained");
}

/// Hands `results` to `callback`; a panicking callback loses only its own
/// batch and the worker keeps serving the queue.
fn deliver<O>(kind: DispatchKind, callback: &ResultCallback<O>, results: Vec<O>) {
    let results_len = results.len();
    if panic::catch_unwind(AssertUnwindSafe(|| callback(results))).is_err() {
        error!(
            target: DISPATCH_TARGET,
            %kind,
            results = results_len,
            "result callback panicked"
        );
    }
}

/// Resolves `batch` and groups results by callback identity.
///
/// Groups appear in the order their callback was first seen; results within a
/// group keep request order.
fn resolve_batch<R, O, V>(
    resolver: &V,
    batch: Vec<PendingRequest<R, O>>,
) -> Vec<(ResultCallback<O>, Vec<O>)>
where
    V: Resolve<R, O>,
{
    let mut groups: Vec<(ResultCallback<O>, Vec<O>)> = Vec::new();
    for PendingRequest { request, callback } in batch {
        let result = resolver.resolve(request);
        match groups
            .iter_mut()
            .find(|(known, _)| Arc::ptr_eq(known, &callback))
        {
            Some((_, results)) => results.push(result),
            None => groups.push((callback, vec![result])),
        }
    }
    groups
}
