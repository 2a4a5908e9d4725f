//! Values exchanged with the interpreter and their encodings.

pub mod codec;
mod descriptor;
mod literal;
mod types;

pub use descriptor::*;
pub use literal::*;
pub use types::*;
