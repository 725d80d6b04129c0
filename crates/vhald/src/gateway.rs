//! Host-facing façade over the store, the dispatchers and the agent bridge.
//!
//! [`PropertyGateway`] implements [`VehicleHardware`], the interface the
//! vehicle HAL host programs against. Reads and writes are queued on the
//! `vhal-get` and `vhal-set` dispatchers and answered asynchronously through
//! host callbacks; store changes flow back to the host as property-change
//! events regardless of whether they came from the host or from the agent.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use tracing::{debug, info, warn};
use vhal_bridge::SetForwarder;
use vhal_types::{
    ConfigDeclaration, GetValueRequest, GetValueResult, PropertyConfig, PropertyId, PropertyValue,
    SetValueErrorEvent, SetValueRequest, SetValueResult, StatusCode, elapsed_realtime_nanos,
};

use crate::dispatcher::{DispatchKind, DispatcherError, RequestDispatcher, ResultCallback};
use crate::resolver::{GetResolver, SetResolver};
use crate::store::PropertyStore;

const GATEWAY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::gateway");

const DUMP_USAGE: &str = "usage: dump [--help]\n\
  (no options)  print every stored value as JSON, the bridge state and queue depths\n\
  --help        print this message";

/// Receives batches of get results.
pub type GetValuesCallback = ResultCallback<GetValueResult>;
/// Receives batches of set results.
pub type SetValuesCallback = ResultCallback<SetValueResult>;
/// Receives property-change events.
pub type PropertyChangeCallback = Arc<dyn Fn(Vec<PropertyValue>) + Send + Sync>;
/// Receives failed forwarded writes.
pub type PropertySetErrorCallback = Arc<dyn Fn(Vec<SetValueErrorEvent>) + Send + Sync>;

/// Output of [`VehicleHardware::dump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpResult {
    /// Whether the host should append its own state to the dump.
    pub caller_should_dump_state: bool,
    /// Text to emit.
    pub buffer: String,
}

/// Interface exposed to the vehicle HAL host.
pub trait VehicleHardware: Send + Sync {
    /// Every configured property.
    fn get_all_property_configs(&self) -> Vec<PropertyConfig>;

    /// Queues reads; `callback` receives the results in batches.
    fn get_values(&self, callback: GetValuesCallback, requests: Vec<GetValueRequest>)
    -> StatusCode;

    /// Queues writes; `callback` receives the results in batches.
    fn set_values(&self, callback: SetValuesCallback, requests: Vec<SetValueRequest>)
    -> StatusCode;

    /// Renders diagnostic state.
    fn dump(&self, options: &[String]) -> DumpResult;

    /// Liveness probe.
    fn check_health(&self) -> StatusCode;

    /// Installs the property-change callback.
    fn register_on_property_change_event(&self, callback: PropertyChangeCallback);

    /// Installs the forwarded-write failure callback.
    fn register_on_property_set_error_event(&self, callback: PropertySetErrorCallback);

    /// Adjusts the sampling rate of a continuous property.
    fn update_sample_rate(&self, property: i32, area: i32, sample_rate: f32) -> StatusCode;
}

/// Host callbacks shared between the gateway, the store hook and the set
/// resolver.
#[derive(Default)]
pub(crate) struct HostCallbacks {
    property_change: RwLock<Option<PropertyChangeCallback>>,
    set_error: RwLock<Option<PropertySetErrorCallback>>,
}

impl HostCallbacks {
    fn property_changed(&self, value: &PropertyValue) {
        let callback = self
            .property_change
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(vec![value.clone()]);
        }
    }

    pub(crate) fn set_error(&self, event: SetValueErrorEvent) {
        let callback = self
            .set_error
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone();
        match callback {
            Some(callback) => callback(vec![event]),
            None => debug!(
                target: GATEWAY_TARGET,
                property = event.id.property,
                area = event.id.area,
                "no set-error callback registered"
            ),
        }
    }
}

/// The daemon's [`VehicleHardware`] implementation.
pub struct PropertyGateway {
    store: Arc<dyn PropertyStore>,
    forwarder: Arc<dyn SetForwarder>,
    callbacks: Arc<HostCallbacks>,
    get: RequestDispatcher<GetValueRequest, GetValueResult>,
    set: RequestDispatcher<SetValueRequest, SetValueResult>,
    /// Read-locked for the whole of a submission, write-locked to stop.
    stopped: RwLock<bool>,
}

impl PropertyGateway {
    /// Seeds `store` from `declarations` and starts both dispatchers.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError`] when a worker thread cannot be spawned.
    pub fn new(
        store: Arc<dyn PropertyStore>,
        forwarder: Arc<dyn SetForwarder>,
        declarations: &[ConfigDeclaration],
    ) -> Result<Self, DispatcherError> {
        seed_store(store.as_ref(), declarations);

        let callbacks = Arc::new(HostCallbacks::default());
        let hook = Arc::clone(&callbacks);
        store.set_on_change(Arc::new(move |value: &PropertyValue| {
            hook.property_changed(value);
        }));

        let get = RequestDispatcher::spawn(DispatchKind::Get, GetResolver::new(Arc::clone(&store)))?;
        let set = RequestDispatcher::spawn(
            DispatchKind::Set,
            SetResolver::new(
                Arc::clone(&store),
                Arc::clone(&forwarder),
                Arc::clone(&callbacks),
            ),
        )?;
        info!(
            target: GATEWAY_TARGET,
            properties = declarations.len(),
            "property gateway ready"
        );
        Ok(Self {
            store,
            forwarder,
            callbacks,
            get,
            set,
            stopped: RwLock::new(false),
        })
    }

    /// Drains and stops both dispatchers.
    ///
    /// Requests submitted afterwards are refused with
    /// [`StatusCode::InternalError`]. Repeated calls are harmless.
    ///
    /// # Errors
    ///
    /// Returns the first dispatcher failure; both dispatchers are stopped
    /// regardless.
    pub fn stop(&self) -> Result<(), DispatcherError> {
        {
            let mut stopped = self
                .stopped
                .write()
                .unwrap_or_else(|poison| poison.into_inner());
            if *stopped {
                return Ok(());
            }
            *stopped = true;
        }
        let get = self.get.stop();
        let set = self.set.stop();
        info!(target: GATEWAY_TARGET, "property gateway stopped");
        get.and(set)
    }

    /// Returns a guard admitting submissions, or `None` once stopped.
    ///
    /// The guard must be held until every request of the call is queued.
    fn admit(&self, kind: DispatchKind, requests: usize) -> Option<RwLockReadGuard<'_, bool>> {
        let stopped = self
            .stopped
            .read()
            .unwrap_or_else(|poison| poison.into_inner());
        if *stopped {
            warn!(
                target: GATEWAY_TARGET,
                %kind,
                requests,
                "request refused after shutdown"
            );
            return None;
        }
        Some(stopped)
    }

    fn render_state(&self) -> String {
        let mut lines: Vec<String> = self
            .store
            .read_all_values()
            .iter()
            .map(|value| {
                serde_json::to_string(value)
                    .unwrap_or_else(|error| format!("{{\"id\":\"{}\",\"error\":\"{error}\"}}", value.id))
            })
            .collect();
        let bridge = if self.forwarder.is_connected() {
            "connected"
        } else {
            "disconnected"
        };
        lines.push(format!("bridge: {bridge}"));
        lines.push(format!(
            "queues: get={} set={}",
            self.get.pending(),
            self.set.pending()
        ));
        lines.join("\n")
    }
}

impl VehicleHardware for PropertyGateway {
    fn get_all_property_configs(&self) -> Vec<PropertyConfig> {
        self.store.all_configs()
    }

    fn get_values(
        &self,
        callback: GetValuesCallback,
        requests: Vec<GetValueRequest>,
    ) -> StatusCode {
        let Some(_admitted) = self.admit(DispatchKind::Get, requests.len()) else {
            return StatusCode::InternalError;
        };
        for request in requests {
            self.get.add_request(request, Arc::clone(&callback));
        }
        StatusCode::Ok
    }

    fn set_values(
        &self,
        callback: SetValuesCallback,
        requests: Vec<SetValueRequest>,
    ) -> StatusCode {
        let Some(_admitted) = self.admit(DispatchKind::Set, requests.len()) else {
            return StatusCode::InternalError;
        };
        for request in requests {
            self.set.add_request(request, Arc::clone(&callback));
        }
        StatusCode::Ok
    }

    fn dump(&self, options: &[String]) -> DumpResult {
        match options.first().map(String::as_str) {
            None => DumpResult {
                caller_should_dump_state: true,
                buffer: self.render_state(),
            },
            Some("--help") => DumpResult {
                caller_should_dump_state: false,
                buffer: DUMP_USAGE.to_owned(),
            },
            Some(option) => DumpResult {
                caller_should_dump_state: false,
                buffer: format!("unknown option: {option}\n{DUMP_USAGE}"),
            },
        }
    }

    fn check_health(&self) -> StatusCode {
        StatusCode::Ok
    }

    fn register_on_property_change_event(&self, callback: PropertyChangeCallback) {
        *self
            .callbacks
            .property_change
            .write()
            .unwrap_or_else(|poison| poison.into_inner()) = Some(callback);
    }

    fn register_on_property_set_error_event(&self, callback: PropertySetErrorCallback) {
        *self
            .callbacks
            .set_error
            .write()
            .unwrap_or_else(|poison| poison.into_inner()) = Some(callback);
    }

    fn update_sample_rate(&self, property: i32, area: i32, sample_rate: f32) -> StatusCode {
        info!(
            target: GATEWAY_TARGET,
            property,
            area,
            sample_rate,
            "sample rate updated"
        );
        StatusCode::Ok
    }
}

impl Drop for PropertyGateway {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(target: GATEWAY_TARGET, %error, "property gateway stopped uncleanly");
        }
    }
}

fn seed_store(store: &dyn PropertyStore, declarations: &[ConfigDeclaration]) {
    for declaration in declarations {
        let config = &declaration.config;
        store.register_property(config.clone());
        for area in config.areas() {
            let id = PropertyId::new(config.property, area);
            let Some(initial) = declaration.initial_value_for(area) else {
                warn!(
                    target: GATEWAY_TARGET,
                    property = id.property,
                    area = id.area,
                    "no initial value declared for area"
                );
                continue;
            };
            let value = PropertyValue::new(id, elapsed_realtime_nanos(), initial.clone());
            if let Err(error) = store.write_value(value, true) {
                warn!(
                    target: GATEWAY_TARGET,
                    property = id.property,
                    area = id.area,
                    %error,
                    "failed to seed initial value"
                );
            }
        }
    }
}
