//! Error types for bridge operations.

use crate::value::ShapeError;

/// Error type for spawning the interpreter process.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    /// The interpreter binary was not found.
    #[error("Julia binary not found: {0}")]
    NotFound(String),
    /// Permission denied when spawning.
    #[error("Permission denied spawning {0}")]
    PermissionDenied(String),
    /// A standard stream of the child was not piped.
    #[error("Interpreter {0} not available")]
    MissingStream(&'static str),
    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpawnError {
    /// Create a `SpawnError` from an I/O error, classifying common cases.
    pub(crate) fn from_io(program: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(program.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(program.to_string()),
            _ => Self::Io(err),
        }
    }
}

/// Error type for bridge operations.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// The interpreter could not be launched.
    #[error("Failed to spawn interpreter: {0}")]
    Spawn(#[from] SpawnError),

    /// The interpreter never signalled readiness.
    #[error("Interpreter startup failed: {0}")]
    Startup(String),

    /// The pipes to the interpreter failed after it was opened.
    #[error("Connection to interpreter broken: {0}")]
    ConnectionBroken(#[source] std::io::Error),

    /// A response did not have the expected shape.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A value's runtime type has no encoding.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A raw payload read stopped at its deadline.
    #[error("Short read: expected {expected} bytes, received {received}")]
    ShortRead { expected: usize, received: usize },

    /// Decoded array data did not fit its dimensions.
    #[error("Malformed array: {0}")]
    Shape(#[from] ShapeError),

    /// The bridge is closed and implicit opening is disabled.
    #[error("Bridge is not open")]
    NotOpen,
}

impl BridgeError {
    /// Whether the interpreter connection is unusable after this error.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, BridgeError::ConnectionBroken(_))
    }
}
