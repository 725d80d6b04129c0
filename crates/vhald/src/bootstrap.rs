//! Service bootstrap: configuration, telemetry, store, gateway and bridge.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;
use vhal_bridge::{AgentBridge, AgentTransport, BridgeError};
use vhal_config::Config;

use crate::declarations::{FORWARDED_PROPERTIES, default_declarations};
use crate::dispatcher::DispatcherError;
use crate::gateway::PropertyGateway;
use crate::health::{HealthConnectionObserver, HealthReporter};
use crate::inbound::StoreInboundSink;
use crate::store::{MemoryPropertyStore, PropertyStore};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the service configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The request dispatchers could not be started.
    #[error("failed to start property gateway: {source}")]
    Gateway {
        /// Underlying dispatcher error.
        #[source]
        source: DispatcherError,
    },
}

/// Errors raised while starting or stopping a bootstrapped [`Service`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The agent bridge failed to start or stop.
    #[error("agent bridge failed: {source}")]
    Bridge {
        /// Underlying bridge error.
        #[source]
        source: BridgeError,
    },
    /// A request dispatcher failed to stop.
    #[error("request dispatcher failed: {source}")]
    Dispatcher {
        /// Underlying dispatcher error.
        #[source]
        source: DispatcherError,
    },
}

/// A bootstrapped service: the gateway the host talks to and the bridge
/// feeding it.
pub struct Service {
    config: Config,
    gateway: Arc<PropertyGateway>,
    bridge: Arc<AgentBridge>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Service {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// The host-facing gateway.
    #[must_use]
    pub fn gateway(&self) -> Arc<PropertyGateway> {
        Arc::clone(&self.gateway)
    }

    /// The agent bridge.
    #[must_use]
    pub fn bridge(&self) -> &AgentBridge {
        &self.bridge
    }

    /// Starts the bridge thread.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Bridge`] when the thread cannot be started.
    pub fn start(&self) -> Result<(), ServiceError> {
        self.bridge
            .start()
            .map_err(|source| ServiceError::Bridge { source })
    }

    /// Drains the gateway, then stops the bridge.
    ///
    /// Both components are stopped even when the first one fails; the first
    /// failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] describing the first component that failed.
    pub fn shutdown(&self) -> Result<(), ServiceError> {
        self.reporter.shutdown_starting();
        let gateway = self
            .gateway
            .stop()
            .map_err(|source| ServiceError::Dispatcher { source });
        let bridge = self
            .bridge
            .stop()
            .map_err(|source| ServiceError::Bridge { source });
        self.reporter.shutdown_completed();
        gateway.and(bridge)
    }
}

/// Bootstraps the service using the supplied collaborators.
///
/// The bridge is built but not started; call [`Service::start`].
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration, telemetry or the gateway
/// fail. Every failure is also reported to `reporter`.
pub fn bootstrap_with<T>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    transport: T,
) -> Result<Service, BootstrapError>
where
    T: AgentTransport + 'static,
{
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let store: Arc<dyn PropertyStore> = Arc::new(MemoryPropertyStore::new());
    let bridge = Arc::new(
        AgentBridge::new(transport, FORWARDED_PROPERTIES, config.bridge_timings())
            .with_inbound_sink(Arc::new(StoreInboundSink::new(Arc::clone(&store))))
            .with_observer(Arc::new(HealthConnectionObserver::new(Arc::clone(&reporter)))),
    );
    let gateway = match PropertyGateway::new(store, bridge.clone(), &default_declarations()) {
        Ok(gateway) => Arc::new(gateway),
        Err(source) => {
            let error = BootstrapError::Gateway { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Service {
        config,
        gateway,
        bridge,
        telemetry,
        reporter,
    })
}
