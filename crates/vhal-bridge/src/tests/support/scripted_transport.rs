//! Agent transport driven by a test-controlled script.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{
    AgentTransport, DiscoveryOutcome, EntitySet, InboundMessage, SequenceNumber,
    SetPropertyRequest, TransportError,
};

#[derive(Debug)]
struct Script {
    discovery: DiscoveryOutcome,
    pings: VecDeque<bool>,
    ping_default: bool,
    fail_creation: bool,
    fail_sends: bool,
    fail_teardown: bool,
    inbound: VecDeque<InboundMessage>,
    sent: Vec<SetPropertyRequest>,
    created: usize,
    destroyed: usize,
    live: Option<usize>,
    stale_sends: usize,
}

/// Handle used to steer and inspect a [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct ScriptHandle {
    script: Arc<Mutex<Script>>,
}

impl ScriptHandle {
    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Sets the outcome of every discovery attempt.
    pub fn set_discovery(&self, outcome: DiscoveryOutcome) {
        self.lock().discovery = outcome;
    }

    /// Queues explicit ping results consumed before the default applies.
    pub fn queue_pings(&self, results: &[bool]) {
        self.lock().pings.extend(results.iter().copied());
    }

    /// Sets the ping result used once the queue is empty.
    pub fn set_ping_default(&self, answers: bool) {
        self.lock().ping_default = answers;
    }

    /// Makes entity creation fail.
    pub fn fail_creation(&self) {
        self.lock().fail_creation = true;
    }

    /// Makes the entity set refuse sends.
    pub fn fail_sends(&self) {
        self.lock().fail_sends = true;
    }

    /// Makes entity teardown report an error.
    pub fn fail_teardown(&self) {
        self.lock().fail_teardown = true;
    }

    /// Queues a message returned by the next spin.
    pub fn queue_inbound(&self, message: InboundMessage) {
        self.lock().inbound.push_back(message);
    }

    /// Requests received by the entity set.
    pub fn sent(&self) -> Vec<SetPropertyRequest> {
        self.lock().sent.clone()
    }

    /// Number of entity sets created.
    pub fn created(&self) -> usize {
        self.lock().created
    }

    /// Number of entity sets destroyed.
    pub fn destroyed(&self) -> usize {
        self.lock().destroyed
    }

    /// Sends that reached an entity set after it was destroyed or replaced.
    pub fn stale_sends(&self) -> usize {
        self.lock().stale_sends
    }
}

/// Transport whose answers come from a [`ScriptHandle`].
#[derive(Debug)]
pub struct ScriptedTransport {
    handle: ScriptHandle,
}

impl ScriptedTransport {
    /// Builds a transport whose agent is discovered and answers pings.
    pub fn answering() -> Self {
        Self {
            handle: ScriptHandle {
                script: Arc::new(Mutex::new(Script {
                    discovery: DiscoveryOutcome::Found,
                    pings: VecDeque::new(),
                    ping_default: true,
                    fail_creation: false,
                    fail_sends: false,
                    fail_teardown: false,
                    inbound: VecDeque::new(),
                    sent: Vec::new(),
                    created: 0,
                    destroyed: 0,
                    live: None,
                    stale_sends: 0,
                })),
            },
        }
    }

    /// Builds a transport whose agent is never discovered.
    pub fn silent() -> Self {
        let transport = Self::answering();
        transport.handle.set_discovery(DiscoveryOutcome::Timeout);
        transport.handle.set_ping_default(false);
        transport
    }

    /// Returns the steering handle.
    pub fn handle(&self) -> ScriptHandle {
        self.handle.clone()
    }
}

impl AgentTransport for ScriptedTransport {
    fn discover(&mut self, _timeout: Duration) -> DiscoveryOutcome {
        self.handle.lock().discovery.clone()
    }

    fn ping(&mut self, _timeout: Duration, attempts: u32) -> Result<(), TransportError> {
        let mut script = self.handle.lock();
        let answered = match script.pings.pop_front() {
            Some(result) => result,
            None => script.ping_default,
        };
        if answered {
            Ok(())
        } else {
            Err(TransportError::PingExhausted { attempts })
        }
    }

    fn create_entities(&mut self) -> Result<Box<dyn EntitySet>, TransportError> {
        let mut script = self.handle.lock();
        if script.fail_creation {
            return Err(TransportError::EntityCreation {
                entity: String::from("client"),
                message: String::from("scripted failure"),
            });
        }
        script.created += 1;
        let generation = script.created;
        script.live = Some(generation);
        Ok(Box::new(ScriptedEntities {
            handle: self.handle.clone(),
            generation,
        }))
    }
}

struct ScriptedEntities {
    handle: ScriptHandle,
    generation: usize,
}

impl EntitySet for ScriptedEntities {
    fn send(&mut self, request: &SetPropertyRequest) -> Result<SequenceNumber, TransportError> {
        let mut script = self.handle.lock();
        if script.live != Some(self.generation) {
            script.stale_sends += 1;
        }
        if script.fail_sends {
            return Err(TransportError::Rejected {
                message: String::from("scripted refusal"),
            });
        }
        script.sent.push(request.clone());
        Ok(SequenceNumber::try_from(script.sent.len()).unwrap_or(SequenceNumber::MAX))
    }

    fn spin_some(
        &mut self,
        _budget: Duration,
        deliver: &mut dyn FnMut(InboundMessage),
    ) -> Result<(), TransportError> {
        let drained: Vec<InboundMessage> = self.handle.lock().inbound.drain(..).collect();
        for message in drained {
            deliver(message);
        }
        Ok(())
    }

    fn destroy(self: Box<Self>) -> Result<(), TransportError> {
        let mut script = self.handle.lock();
        script.destroyed += 1;
        if script.live == Some(self.generation) {
            script.live = None;
        }
        if script.fail_teardown {
            return Err(TransportError::Teardown {
                entity: String::from("node"),
                message: String::from("scripted failure"),
            });
        }
        Ok(())
    }
}
