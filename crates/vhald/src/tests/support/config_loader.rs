//! Configuration loaders for success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::OrthoError;
use vhal_config::{Config, LogFormat};

use crate::bootstrap::ConfigLoader;

/// Loader with short bridge timings so the loopback agent connects quickly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestConfigLoader;

impl TestConfigLoader {
    pub fn config() -> Config {
        Config {
            log_format: LogFormat::Compact,
            discovery_timeout_ms: 10,
            ping_timeout_ms: 10,
            ping_attempts: 1,
            spin_budget_ms: 5,
            retry_backoff_ms: 5,
            ..Config::default()
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Self::config())
    }
}

/// Loader that intentionally fails by passing an unparsable CLI value.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("vhald"),
            OsString::from("--ping-attempts"),
            OsString::from("many"),
        ];
        Config::load_from_iter(args)
    }
}
