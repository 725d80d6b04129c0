//! World driving the full launch sequence on a background thread.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use vhal_bridge::LoopbackTransport;

use crate::bootstrap::ConfigLoader;
use crate::process::launch::{LaunchPlan, run_service_with};
use crate::process::{LaunchError, ShutdownError, ShutdownSignal};

use super::reporter::RecordingHealthReporter;

pub struct ProcessWorld {
    pub reporter: Arc<RecordingHealthReporter>,
    pub shutdown: TestShutdownSignal,
    handle: Option<JoinHandle<Result<(), LaunchError>>>,
    result: Option<Result<(), LaunchError>>,
}

impl Default for ProcessWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessWorld {
    pub fn new() -> Self {
        Self {
            reporter: Arc::new(RecordingHealthReporter::default()),
            shutdown: TestShutdownSignal::new(),
            handle: None,
            result: None,
        }
    }

    pub fn launch<L>(&mut self, loader: L)
    where
        L: ConfigLoader + 'static,
    {
        assert!(self.handle.is_none(), "service already launched");
        let reporter = self.reporter.clone() as Arc<dyn crate::health::HealthReporter>;
        let shutdown = self.shutdown.clone();
        self.handle = Some(thread::spawn(move || {
            run_service_with(LaunchPlan {
                loader,
                reporter,
                transport: LoopbackTransport::new(),
                shutdown,
            })
        }));
    }

    /// Signals shutdown and waits for the launch thread to return.
    pub fn finish(&mut self) {
        self.shutdown.trigger();
        if let Some(handle) = self.handle.take() {
            self.result = Some(handle.join().expect("service thread panicked"));
        }
    }

    pub fn result(&self) -> Option<&Result<(), LaunchError>> {
        self.result.as_ref()
    }
}

impl Drop for ProcessWorld {
    fn drop(&mut self) {
        self.shutdown.trigger();
        if let Some(handle) = self.handle.take() {
            drop(handle.join());
        }
    }
}

/// Shutdown signal released explicitly by the test.
#[derive(Clone)]
pub struct TestShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl TestShutdownSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().expect("shutdown mutex poisoned");
        *triggered = true;
        cvar.notify_all();
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().expect("shutdown mutex poisoned");
        while !*triggered {
            triggered = cvar
                .wait(triggered)
                .expect("shutdown mutex poisoned during wait");
        }
        Ok(())
    }
}
