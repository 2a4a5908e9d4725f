//! Interpreter process lifetime: start, readiness detection, termination.

use std::time::Duration;

use tokio::process::Child;

use crate::error::{BridgeError, SpawnError};
use crate::protocol::{strip_prompt, SENTINEL, VERSION_PREFIX};

use super::{JuliaProcessBuilder, Transport};

/// A running interpreter that has signalled readiness.
#[derive(Debug)]
pub struct JuliaProcess {
    child: Child,
    transport: Transport,
    version: Option<String>,
}

impl JuliaProcess {
    /// Spawn the interpreter and wait until it prints the sentinel.
    ///
    /// Banner lines are read one at a time, each bounded by `timeout`; the
    /// one starting with the version prefix is kept.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Spawn` if the process cannot be launched, and
    /// `BridgeError::Startup` if no sentinel arrives before a line read
    /// times out or the process exits. The process is killed in that case.
    pub async fn start(
        builder: &JuliaProcessBuilder,
        timeout: Duration,
        poll_delay: Duration,
    ) -> Result<Self, BridgeError> {
        let mut child = builder.spawn()?;
        let stdin = child.stdin.take().ok_or(SpawnError::MissingStream("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(SpawnError::MissingStream("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(SpawnError::MissingStream("stderr"))?;

        let mut process = Self {
            child,
            transport: Transport::new(stdin, stdout, stderr, poll_delay),
            version: None,
        };

        let mut last_line = None;
        loop {
            let Some(line) = process.transport.read_line(timeout).await else {
                let reason = match process.child.try_wait() {
                    Ok(Some(status)) => format!("interpreter exited with {status}"),
                    _ => format!(
                        "no readiness marker within {}ms",
                        timeout.as_millis()
                    ),
                };
                process.stop();
                let reason = match last_line {
                    Some(line) => format!("{reason} (last output: {line})"),
                    None => reason,
                };
                return Err(BridgeError::Startup(reason));
            };

            let line = strip_prompt(&line);
            if line == SENTINEL {
                break;
            }
            if line.starts_with(VERSION_PREFIX) {
                process.version = Some(line.to_string());
            } else {
                tracing::trace!(line = %line, "Startup output");
            }
            last_line = Some(line.to_string());
        }

        process.transport.drain_pending();
        tracing::info!(
            pid = ?process.child.id(),
            version = ?process.version,
            "Interpreter ready"
        );
        Ok(process)
    }

    /// Version banner line, if the interpreter printed one.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Get the process ID, if still running.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[must_use]
    pub fn transport(&mut self) -> &mut Transport {
        &mut self.transport
    }

    /// Check if the process is still alive without blocking.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Forcefully kill the process. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Err(e) = self.child.start_kill() {
            tracing::debug!(error = %e, "Kill signal not delivered");
        } else {
            tracing::info!(pid = ?self.child.id(), "Interpreter killed");
        }
    }
}

impl Drop for JuliaProcess {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}
