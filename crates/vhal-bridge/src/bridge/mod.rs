//! The agent bridge: public handle plus the background connection thread.

mod connection;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};
use vhal_config::BridgeTimings;
use vhal_types::PropertyValue;

pub(crate) use connection::ConnectionLoop;

use crate::BRIDGE_TARGET;
use crate::errors::{BridgeError, SendRejection};
use crate::fatal::FatalHandler;
use crate::hooks::{ConnectionObserver, InboundSink, SetForwarder};
use crate::state::{ConnectionState, StateCell};
use crate::transport::{AgentTransport, EntitySet, SequenceNumber};
use crate::wire::SetPropertyRequest;

const BRIDGE_THREAD_NAME: &str = "vhal-bridge";

type EntitySlot = Option<Box<dyn EntitySet>>;

/// State shared between the bridge handle and its thread.
pub(crate) struct BridgeShared {
    /// Guards every "check entities, then use them" sequence. The published
    /// state only changes while this lock is held.
    entities: Mutex<EntitySlot>,
    state: StateCell,
    shutdown: AtomicBool,
    forwarded: BTreeSet<i32>,
}

impl BridgeShared {
    fn new(forwarded: BTreeSet<i32>) -> Self {
        Self {
            entities: Mutex::new(None),
            state: StateCell::new(),
            shutdown: AtomicBool::new(false),
            forwarded,
        }
    }

    pub(crate) fn lock_entities(&self) -> MutexGuard<'_, EntitySlot> {
        // A panic inside a transport call leaves the slot either populated or
        // empty; both are valid states to continue from.
        self.entities
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state.load()
    }

    pub(crate) fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

enum Lifecycle {
    NotStarted(Box<ConnectionLoop>),
    Running(JoinHandle<()>),
    Stopped,
}

/// Connection manager for the remote agent.
///
/// The bridge starts [`ConnectionState::Disconnected`]. Once started, its
/// thread discovers and pings the agent, creates the entity set when the
/// agent answers and destroys it again when pings stop succeeding. Callers
/// forward set requests through [`AgentBridge::try_send_set_request`], which
/// never blocks on connectivity: without an entity set the request is
/// rejected at once.
pub struct AgentBridge {
    shared: Arc<BridgeShared>,
    lifecycle: Mutex<Lifecycle>,
}

impl AgentBridge {
    /// Creates a stopped bridge forwarding the listed properties.
    #[must_use]
    pub fn new<T, I>(transport: T, forwarded: I, timings: BridgeTimings) -> Self
    where
        T: AgentTransport + 'static,
        I: IntoIterator<Item = i32>,
    {
        let shared = Arc::new(BridgeShared::new(forwarded.into_iter().collect()));
        let connection = ConnectionLoop::new(Arc::clone(&shared), Box::new(transport), timings);
        Self {
            shared,
            lifecycle: Mutex::new(Lifecycle::NotStarted(Box::new(connection))),
        }
    }

    /// Routes inbound agent traffic to `sink`.
    ///
    /// Has no effect once the bridge has been started.
    #[must_use]
    pub fn with_inbound_sink(self, sink: Arc<dyn InboundSink>) -> Self {
        self.configure(|connection| connection.inbound = sink)
    }

    /// Reports connection transitions to `observer`.
    ///
    /// Has no effect once the bridge has been started.
    #[must_use]
    pub fn with_observer(self, observer: Arc<dyn ConnectionObserver>) -> Self {
        self.configure(|connection| connection.observer = observer)
    }

    /// Replaces the handler invoked when entity creation fails.
    ///
    /// Has no effect once the bridge has been started.
    #[must_use]
    pub fn with_fatal_handler(self, handler: FatalHandler) -> Self {
        self.configure(|connection| connection.fatal = handler)
    }

    fn configure(mut self, apply: impl FnOnce(&mut ConnectionLoop)) -> Self {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(|poison| poison.into_inner());
        if let Lifecycle::NotStarted(connection) = lifecycle {
            apply(connection);
        }
        self
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Spawns the connection thread.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadyStarted`] when called more than once and
    /// [`BridgeError::Spawn`] when the thread cannot be created.
    pub fn start(&self) -> Result<(), BridgeError> {
        let mut lifecycle = self.lock_lifecycle();
        let connection = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::NotStarted(connection) => connection,
            other => {
                *lifecycle = other;
                return Err(BridgeError::AlreadyStarted);
            }
        };

        let handle = thread::Builder::new()
            .name(String::from(BRIDGE_THREAD_NAME))
            .spawn(move || connection.run())
            .map_err(|source| BridgeError::Spawn { source })?;
        *lifecycle = Lifecycle::Running(handle);

        info!(
            target: BRIDGE_TARGET,
            forwarded = ?self.shared.forwarded,
            "agent bridge started"
        );
        Ok(())
    }

    /// Stops the connection thread and waits for it to release the entities.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ThreadPanic`] when the thread panicked.
    pub fn stop(&self) -> Result<(), BridgeError> {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        let previous = std::mem::replace(&mut *self.lock_lifecycle(), Lifecycle::Stopped);
        if let Lifecycle::Running(handle) = previous {
            handle.join().map_err(|_| BridgeError::ThreadPanic)?;
            info!(target: BRIDGE_TARGET, "agent bridge stopped");
        }
        Ok(())
    }

    /// Advisory snapshot of the connection state.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    /// Snapshot of the connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Whether values of `property` are forwarded to the agent.
    #[must_use]
    pub fn forwards(&self, property: i32) -> bool {
        self.shared.forwarded.contains(&property)
    }

    /// Properties forwarded to the agent, in ascending order.
    #[must_use]
    pub fn forwarded_properties(&self) -> Vec<i32> {
        self.shared.forwarded.iter().copied().collect()
    }

    /// Transmits `value` to the agent.
    ///
    /// # Errors
    ///
    /// Returns [`SendRejection::NotForwarded`] for properties served locally,
    /// [`SendRejection::Disconnected`] while no entity set exists and
    /// [`SendRejection::Transport`] when the entity set refuses the request.
    pub fn try_send_set_request(
        &self,
        value: &PropertyValue,
    ) -> Result<SequenceNumber, SendRejection> {
        let property = value.id.property;
        let area = value.id.area;
        if !self.forwards(property) {
            return Err(SendRejection::NotForwarded { property });
        }
        if !self.is_connected() {
            debug!(
                target: BRIDGE_TARGET,
                property,
                area,
                "agent disconnected, set request not sent"
            );
            return Err(SendRejection::Disconnected);
        }

        let request = SetPropertyRequest::from_value(value);
        let mut entities = self.shared.lock_entities();
        let Some(entity_set) = entities.as_mut() else {
            return Err(SendRejection::Disconnected);
        };
        match entity_set.send(&request) {
            Ok(sequence) => {
                debug!(
                    target: BRIDGE_TARGET,
                    property,
                    area,
                    sequence,
                    "set request sent to agent"
                );
                Ok(sequence)
            }
            Err(source) => {
                error!(
                    target: BRIDGE_TARGET,
                    property,
                    area,
                    error = %source,
                    "agent transport refused set request"
                );
                Err(SendRejection::Transport(source))
            }
        }
    }

    /// Transmits `value`, reporting only whether it was handed to the agent.
    pub fn send_set_request(&self, value: &PropertyValue) -> bool {
        self.try_send_set_request(value).is_ok()
    }

    #[cfg(test)]
    pub(crate) fn detach_connection(&self) -> Option<ConnectionLoop> {
        match std::mem::replace(&mut *self.lock_lifecycle(), Lifecycle::Stopped) {
            Lifecycle::NotStarted(connection) => Some(*connection),
            Lifecycle::Running(_) | Lifecycle::Stopped => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn has_entities(&self) -> bool {
        self.shared.lock_entities().is_some()
    }
}

impl SetForwarder for AgentBridge {
    fn forwards(&self, property: i32) -> bool {
        Self::forwards(self, property)
    }

    fn is_connected(&self) -> bool {
        Self::is_connected(self)
    }

    fn try_send_set_request(&self, value: &PropertyValue) -> Result<SequenceNumber, SendRejection> {
        Self::try_send_set_request(self, value)
    }
}

impl Drop for AgentBridge {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(
                target: BRIDGE_TARGET,
                error = %error,
                "agent bridge did not stop cleanly"
            );
        }
    }
}
