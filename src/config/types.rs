//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a bridge session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Interpreter executable. Discovered from `JULIA_HOME` or `PATH` if unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,
    /// Extra interpreter arguments, placed before the fixed startup arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// How long to wait for each startup line, in milliseconds.
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    /// How long to wait for each response line or raw payload, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Sleep between availability checks while waiting for output.
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
    /// Open (or reopen) the interpreter implicitly on first use.
    #[serde(default = "default_auto_open")]
    pub auto_open: bool,
}

fn default_startup_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_poll_delay_ms() -> u64 {
    10
}

fn default_auto_open() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            executable: None,
            args: Vec::new(),
            startup_timeout_ms: default_startup_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            poll_delay_ms: default_poll_delay_ms(),
            auto_open: default_auto_open(),
        }
    }
}

impl BridgeConfig {
    #[must_use]
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms.max(1))
    }

    /// Check the settings a session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.startup_timeout_ms == 0 {
            return Err("startup_timeout_ms must be positive".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be positive".to_string());
        }
        if self.poll_delay_ms > self.request_timeout_ms {
            return Err(format!(
                "poll_delay_ms ({}) exceeds request_timeout_ms ({})",
                self.poll_delay_ms, self.request_timeout_ms
            ));
        }
        if self
            .executable
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err("executable must not be empty".to_string());
        }
        Ok(())
    }
}
