//! Julia Bridge - drive a Julia REPL subprocess from Rust.
//!
//! The bridge launches Julia as a long-lived child process and talks to it
//! over its standard streams:
//!
//! - `process` - spawning, readiness detection and the deadline-bounded transport
//! - `protocol` - sentinel framing of requests and responses
//! - `value` - typed values and their literal and binary encodings
//! - `bridge` - the session and its `exec`/`get`/`set`/`eval`/`call` commands
//!
//! ```ignore
//! use julia_bridge::{JuliaBridge, Value};
//!
//! let mut julia = JuliaBridge::new();
//! assert_eq!(julia.exec("println(1+2)").await?, vec!["3"]);
//! julia.set("x", 7i64).await?;
//! assert_eq!(julia.get("x").await?, Value::Int64(7));
//! julia.close();
//! ```

pub mod bridge;
pub mod config;
pub mod display;
pub mod error;
pub mod process;
pub mod protocol;
pub mod value;

pub use bridge::{JuliaBridge, SessionState};
pub use config::BridgeConfig;
pub use error::{BridgeError, SpawnError};
pub use value::{complex, expr, ArrayData, ElementKind, JuliaExpr, NumericArray, Value};
