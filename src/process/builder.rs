//! Julia process configuration and spawning.
//!
//! This module provides a builder for the interpreter command line and
//! discovery of the interpreter executable.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::config::BridgeConfig;
use crate::error::SpawnError;
use crate::protocol::{startup_script, STARTUP_ARGS};

/// Environment variable naming a Julia installation root.
pub const JULIA_HOME_ENV: &str = "JULIA_HOME";

/// Executable locations tried under the installation root.
pub const JULIA_EXEC: [&str; 2] = ["bin/julia", "bin/julia.exe"];

/// Command resolved through `PATH` when no installation root applies.
pub const DEFAULT_JULIA_COMMAND: &str = "julia";

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Find an interpreter executable under the installation root `home`.
#[must_use]
pub fn find_julia_exec_in(home: Option<&Path>) -> PathBuf {
    if let Some(home) = home {
        for name in JULIA_EXEC {
            let candidate = home.join(name);
            if is_executable(&candidate) {
                if let Ok(path) = candidate.canonicalize() {
                    return path;
                }
            }
        }
        tracing::debug!(home = %home.display(), "No executable under {JULIA_HOME_ENV}");
    }
    PathBuf::from(DEFAULT_JULIA_COMMAND)
}

/// Find the interpreter executable using `JULIA_HOME`, falling back to `julia`.
#[must_use]
pub fn find_julia_exec() -> PathBuf {
    let home = std::env::var_os(JULIA_HOME_ENV).map(PathBuf::from);
    find_julia_exec_in(home.as_deref())
}

/// Builder for the interpreter command line.
#[derive(Debug, Clone)]
pub struct JuliaProcessBuilder {
    program: PathBuf,
    extra_args: Vec<String>,
    startup: bool,
}

impl Default for JuliaProcessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JuliaProcessBuilder {
    /// Use the discovered interpreter with no extra arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::with_command(find_julia_exec(), Vec::<String>::new())
    }

    /// Use the discovered interpreter with extra arguments.
    #[must_use]
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_command(find_julia_exec(), args)
    }

    /// Use an explicit interpreter command with extra arguments.
    #[must_use]
    pub fn with_command<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            extra_args: args.into_iter().map(Into::into).collect(),
            startup: true,
        }
    }

    /// Build from a session configuration.
    #[must_use]
    pub fn from_config(config: &BridgeConfig) -> Self {
        match &config.executable {
            Some(program) => Self::with_command(program.clone(), config.args.iter().cloned()),
            None => Self::with_args(config.args.iter().cloned()),
        }
    }

    /// Run the command exactly as given, without the startup arguments.
    ///
    /// Used to drive stand-in interpreters in tests.
    #[must_use]
    pub fn without_startup(mut self) -> Self {
        self.startup = false;
        self
    }

    /// Get the interpreter program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command-line arguments.
    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.extra_args.clone();
        if self.startup {
            args.extend(STARTUP_ARGS.iter().map(|s| (*s).to_string()));
            args.push(startup_script());
        }
        args
    }

    /// Spawn the interpreter with all three standard streams piped.
    ///
    /// The child is killed if its handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the process fails to spawn.
    pub fn spawn(&self) -> Result<Child, SpawnError> {
        let args = self.build_args();
        let program = self.program.display().to_string();
        tracing::debug!(program = %program, args = ?self.extra_args, "Spawning interpreter");

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .env("TERM", "dumb")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| SpawnError::from_io(&program, e))
    }
}
