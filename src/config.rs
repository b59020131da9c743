use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::adapters::EngineLimits;

const APP_NAME: &str = "autoproxy";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// PAC location to use instead of the one published by the OS.
    pub pac_url: Option<String>,
    /// Honour `HTTP_PROXY`, `HTTPS_PROXY`, `ALL_PROXY` and `NO_PROXY`.
    pub use_environment: bool,
    pub fetch_timeout_secs: u64,
    pub eval_timeout_ms: u64,
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let limits = EngineLimits::default();
        Self {
            pac_url: None,
            use_environment: true,
            fetch_timeout_secs: 15,
            eval_timeout_ms: limits.timeout.as_millis() as u64,
            loop_iteration_limit: limits.loop_iteration_limit,
            recursion_limit: limits.recursion_limit,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the platform configuration directory.
    /// A missing file is created with default values.
    pub fn load(path: Option<&Path>) -> Result<Self, confy::ConfyError> {
        match path {
            Some(path) => confy::load_path(path),
            None => confy::load(APP_NAME, None),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn engine_limits(&self) -> EngineLimits {
        EngineLimits {
            timeout: Duration::from_millis(self.eval_timeout_ms),
            loop_iteration_limit: self.loop_iteration_limit,
            recursion_limit: self.recursion_limit,
        }
    }
}
