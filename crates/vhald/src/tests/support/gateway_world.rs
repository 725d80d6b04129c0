//! World wiring a gateway to an in-memory store and a mock forwarder.

use std::sync::Arc;

use vhal_types::{
    GetValueRequest, GetValueResult, PropertyId, PropertyValue, SetValueErrorEvent,
    SetValueRequest, SetValueResult, StatusCode, elapsed_realtime_nanos,
};

use crate::declarations::default_declarations;
use crate::gateway::{PropertyGateway, VehicleHardware};
use crate::store::MemoryPropertyStore;

use super::batches::BatchLog;
use super::forwarder::{ForwarderMode, forwarder};

pub struct GatewayWorld {
    pub gateway: PropertyGateway,
    pub store: Arc<MemoryPropertyStore>,
    pub gets: Arc<BatchLog<GetValueResult>>,
    pub sets: Arc<BatchLog<SetValueResult>>,
    pub changes: Arc<BatchLog<PropertyValue>>,
    pub set_errors: Arc<BatchLog<SetValueErrorEvent>>,
    pub write_started_at: Option<i64>,
}

impl GatewayWorld {
    pub fn new(mode: ForwarderMode) -> Self {
        let store = Arc::new(MemoryPropertyStore::new());
        let gateway = PropertyGateway::new(
            store.clone(),
            Arc::new(forwarder(mode)),
            &default_declarations(),
        )
        .expect("gateway should start");
        let changes = BatchLog::new();
        let set_errors = BatchLog::new();
        gateway.register_on_property_change_event(changes.callback());
        gateway.register_on_property_set_error_event(set_errors.callback());
        Self {
            gateway,
            store,
            gets: BatchLog::new(),
            sets: BatchLog::new(),
            changes,
            set_errors,
            write_started_at: None,
        }
    }

    pub fn set(&mut self, requests: Vec<SetValueRequest>) {
        self.write_started_at = Some(elapsed_realtime_nanos());
        let status = self.gateway.set_values(self.sets.callback(), requests);
        assert_eq!(status, StatusCode::Ok);
    }

    pub fn get(&self, request_id: i64, id: PropertyId) {
        let status = self
            .gateway
            .get_values(self.gets.callback(), vec![GetValueRequest { request_id, id }]);
        assert_eq!(status, StatusCode::Ok);
    }

    pub fn set_result(&self, request_id: i64) -> SetValueResult {
        find_result(&self.sets, request_id, |result| result.request_id)
    }

    pub fn get_result(&self, request_id: i64) -> GetValueResult {
        find_result(&self.gets, request_id, |result| result.request_id)
    }
}

/// Waits until `log` holds the result for `request_id`.
fn find_result<T, F>(log: &BatchLog<T>, request_id: i64, key: F) -> T
where
    T: Clone + Send + 'static,
    F: Fn(&T) -> i64,
{
    let mut seen = log.items();
    loop {
        if let Some(found) = seen.iter().find(|item| key(*item) == request_id) {
            return found.clone();
        }
        seen = log.wait_for(seen.len() + 1);
    }
}
