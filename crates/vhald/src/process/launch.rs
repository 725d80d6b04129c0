//! Runs the service from bootstrap to signal-driven shutdown.

use std::sync::Arc;

use tracing::info;
use vhal_bridge::{AgentTransport, LoopbackTransport};

use crate::bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to run the service.
pub(crate) struct LaunchPlan<L, T, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) transport: T,
    pub(crate) shutdown: S,
}

/// Runs the service with the production collaborators.
///
/// The agent is reached through the in-process loopback transport.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, bootstrap, the bridge or the
/// signal listener fail.
pub fn run_service() -> Result<(), LaunchError> {
    run_service_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        transport: LoopbackTransport::new(),
        shutdown: SystemShutdownSignal,
    })
}

/// Runs the service with injected collaborators.
pub(crate) fn run_service_with<L, T, S>(plan: LaunchPlan<L, T, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    T: AgentTransport + 'static,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        transport,
        shutdown,
    } = plan;

    let config = loader.load()?;
    let static_loader = StaticConfigLoader::new(config);
    let service = bootstrap_with(&static_loader, Arc::clone(&reporter), transport)?;
    service.start()?;
    reporter.service_started(service.config());
    shutdown.wait()?;
    service.shutdown()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
