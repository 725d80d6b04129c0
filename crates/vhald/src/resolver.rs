//! Request resolvers run on the dispatcher threads.

use std::sync::Arc;

use tracing::{debug, warn};
use vhal_bridge::{SendRejection, SetForwarder};
use vhal_types::{
    GetValueRequest, GetValueResult, PropertyValue, SetValueErrorEvent, SetValueRequest,
    SetValueResult, StatusCode, elapsed_realtime_nanos,
};

use crate::dispatcher::{DISPATCH_TARGET, Resolve};
use crate::gateway::HostCallbacks;
use crate::store::PropertyStore;

/// Reads values from the store.
pub(crate) struct GetResolver {
    store: Arc<dyn PropertyStore>,
}

impl GetResolver {
    pub(crate) fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self { store }
    }
}

impl Resolve<GetValueRequest, GetValueResult> for GetResolver {
    fn resolve(&self, request: GetValueRequest) -> GetValueResult {
        match self.store.read_value(request.id) {
            Ok(value) => GetValueResult::ok(request.request_id, value),
            Err(error) => {
                debug!(
                    target: DISPATCH_TARGET,
                    request_id = request.request_id,
                    property = request.id.property,
                    area = request.id.area,
                    %error,
                    "get request failed"
                );
                GetValueResult::failed(request.request_id)
            }
        }
    }
}

/// Applies writes locally and forwards them to the agent.
pub(crate) struct SetResolver {
    store: Arc<dyn PropertyStore>,
    forwarder: Arc<dyn SetForwarder>,
    callbacks: Arc<HostCallbacks>,
}

impl SetResolver {
    pub(crate) fn new(
        store: Arc<dyn PropertyStore>,
        forwarder: Arc<dyn SetForwarder>,
        callbacks: Arc<HostCallbacks>,
    ) -> Self {
        Self {
            store,
            forwarder,
            callbacks,
        }
    }

    fn forward(&self, value: &PropertyValue) {
        let id = value.id;
        if !self.forwarder.forwards(id.property) {
            return;
        }
        if !self.forwarder.is_connected() {
            debug!(
                target: DISPATCH_TARGET,
                property = id.property,
                area = id.area,
                "agent disconnected; write applied locally only"
            );
            return;
        }
        match self.forwarder.try_send_set_request(value) {
            Ok(sequence) => debug!(
                target: DISPATCH_TARGET,
                property = id.property,
                area = id.area,
                sequence,
                "write forwarded to agent"
            ),
            Err(SendRejection::Transport(error)) => {
                warn!(
                    target: DISPATCH_TARGET,
                    property = id.property,
                    area = id.area,
                    %error,
                    "agent transport rejected forwarded write"
                );
                self.callbacks.set_error(SetValueErrorEvent {
                    id,
                    error: StatusCode::InternalError,
                });
            }
            // The bridge dropped between the connection check and the send.
            Err(rejection) => debug!(
                target: DISPATCH_TARGET,
                property = id.property,
                area = id.area,
                %rejection,
                "forwarded write skipped"
            ),
        }
    }
}

impl Resolve<SetValueRequest, SetValueResult> for SetResolver {
    fn resolve(&self, request: SetValueRequest) -> SetValueResult {
        let request_id = request.request_id;
        let value = request.value.with_timestamp(elapsed_realtime_nanos());
        let id = value.id;
        match self.store.write_value(value.clone(), true) {
            Ok(()) => {
                self.forward(&value);
                SetValueResult {
                    request_id,
                    status: StatusCode::Ok,
                }
            }
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    request_id,
                    property = id.property,
                    area = id.area,
                    %error,
                    "set request failed"
                );
                SetValueResult {
                    request_id,
                    status: StatusCode::InternalError,
                }
            }
        }
    }
}
