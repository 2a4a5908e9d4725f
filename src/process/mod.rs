//! Interpreter process spawning, supervision and byte transport.

mod builder;
mod supervisor;
mod transport;

pub use builder::*;
pub use supervisor::*;
pub use transport::*;
