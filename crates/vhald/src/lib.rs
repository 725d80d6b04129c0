//! Vehicle property service daemon.
//!
//! The daemon serves vehicle properties to a HAL host through
//! [`PropertyGateway`], an implementation of [`VehicleHardware`]. Host reads
//! and writes are queued and answered asynchronously by two dispatcher
//! threads (`vhal-get` and `vhal-set`) that resolve requests against an
//! in-memory [`PropertyStore`] and deliver results in per-callback batches.
//!
//! Writes to forwarded properties are also sent to a remote signal-bus agent
//! through the [`vhal_bridge::AgentBridge`], and property updates published by
//! the agent flow back into the store, where they surface as host
//! property-change events.
//!
//! Start-up follows a fixed sequence: load configuration through
//! [`vhal_config`], install structured telemetry, seed the store from the
//! built-in declarations, start the dispatchers and the bridge, then block on
//! a termination signal. Shutdown drains every accepted request before the
//! workers exit. Lifecycle transitions are reported through a
//! [`HealthReporter`].

mod bootstrap;
pub mod declarations;
mod dispatcher;
mod gateway;
mod health;
mod inbound;
mod process;
mod queue;
mod resolver;
mod store;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Service, ServiceError, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use dispatcher::{
    DispatchKind, DispatcherError, PendingRequest, RequestDispatcher, Resolve, ResultCallback,
};
pub use gateway::{
    DumpResult, GetValuesCallback, PropertyChangeCallback, PropertyGateway,
    PropertySetErrorCallback, SetValuesCallback, VehicleHardware,
};
pub use health::{HealthConnectionObserver, HealthReporter, StructuredHealthReporter};
pub use inbound::StoreInboundSink;
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_service};
pub use queue::RequestQueue;
pub use store::{MemoryPropertyStore, OnChangeCallback, PropertyStore, StoreError};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
