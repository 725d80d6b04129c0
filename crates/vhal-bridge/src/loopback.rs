//! In-process agent used when no signal bus is attached.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::errors::TransportError;
use crate::transport::{AgentTransport, DiscoveryOutcome, EntitySet, InboundMessage, SequenceNumber};
use crate::wire::SetPropertyRequest;

#[derive(Debug)]
struct LoopbackState {
    online: AtomicBool,
    next_sequence: AtomicI64,
    created: AtomicUsize,
    destroyed: AtomicUsize,
    sent: Mutex<Vec<SetPropertyRequest>>,
    pending: Mutex<VecDeque<InboundMessage>>,
}

/// Control handle for a [`LoopbackTransport`].
///
/// Clones share the same agent.
#[derive(Debug, Clone)]
pub struct LoopbackHandle {
    state: Arc<LoopbackState>,
}

impl LoopbackHandle {
    fn new(online: bool) -> Self {
        Self {
            state: Arc::new(LoopbackState {
                online: AtomicBool::new(online),
                next_sequence: AtomicI64::new(1),
                created: AtomicUsize::new(0),
                destroyed: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
                pending: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Brings the agent online or takes it offline.
    pub fn set_online(&self, online: bool) {
        self.state.online.store(online, Ordering::SeqCst);
    }

    /// Whether the agent currently answers.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.state.online.load(Ordering::SeqCst)
    }

    /// Number of entity sets created so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.state.created.load(Ordering::SeqCst)
    }

    /// Number of entity sets destroyed so far.
    #[must_use]
    pub fn destroyed(&self) -> usize {
        self.state.destroyed.load(Ordering::SeqCst)
    }

    /// Requests the agent has received, in arrival order.
    #[must_use]
    pub fn sent_requests(&self) -> Vec<SetPropertyRequest> {
        lock(&self.state.sent).clone()
    }

    /// Queues a property update as if the agent had published it.
    pub fn publish(&self, message: InboundMessage) {
        lock(&self.state.pending).push_back(message);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Agent transport that answers from inside the process.
///
/// Discovery and pings succeed while the agent is online. Each accepted set
/// request is acknowledged and echoed back as a property update on the next
/// spin.
#[derive(Debug)]
pub struct LoopbackTransport {
    handle: LoopbackHandle,
}

impl LoopbackTransport {
    /// Creates a transport whose agent starts online.
    #[must_use]
    pub fn new() -> Self {
        Self::with_online(true)
    }

    /// Creates a transport whose agent starts in the given state.
    #[must_use]
    pub fn with_online(online: bool) -> Self {
        Self {
            handle: LoopbackHandle::new(online),
        }
    }

    /// Returns a handle controlling the agent.
    #[must_use]
    pub fn handle(&self) -> LoopbackHandle {
        self.handle.clone()
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentTransport for LoopbackTransport {
    fn discover(&mut self, _timeout: Duration) -> DiscoveryOutcome {
        if self.handle.is_online() {
            DiscoveryOutcome::Found
        } else {
            DiscoveryOutcome::Timeout
        }
    }

    fn ping(&mut self, _timeout: Duration, attempts: u32) -> Result<(), TransportError> {
        if self.handle.is_online() {
            Ok(())
        } else {
            Err(TransportError::PingExhausted { attempts })
        }
    }

    fn create_entities(&mut self) -> Result<Box<dyn EntitySet>, TransportError> {
        self.handle.state.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(LoopbackEntities {
            handle: self.handle.clone(),
        }))
    }
}

struct LoopbackEntities {
    handle: LoopbackHandle,
}

impl EntitySet for LoopbackEntities {
    fn send(&mut self, request: &SetPropertyRequest) -> Result<SequenceNumber, TransportError> {
        if !self.handle.is_online() {
            return Err(TransportError::LinkDown);
        }
        let state = &self.handle.state;
        let sequence = state.next_sequence.fetch_add(1, Ordering::SeqCst);
        lock(&state.sent).push(request.clone());

        let mut pending = lock(&state.pending);
        pending.push_back(InboundMessage::SetAcknowledged {
            sequence,
            accepted: true,
        });
        if let Some(value) = request.to_value() {
            pending.push_back(InboundMessage::PropertyUpdate(value));
        }
        Ok(sequence)
    }

    fn spin_some(
        &mut self,
        _budget: Duration,
        deliver: &mut dyn FnMut(InboundMessage),
    ) -> Result<(), TransportError> {
        let drained: Vec<InboundMessage> = lock(&self.handle.state.pending).drain(..).collect();
        for message in drained {
            deliver(message);
        }
        Ok(())
    }

    fn destroy(self: Box<Self>) -> Result<(), TransportError> {
        self.handle.state.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
