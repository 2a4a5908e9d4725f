//! Bridge session and command layer.

mod marshal;
mod session;
mod state;

pub use session::*;
pub use state::*;
