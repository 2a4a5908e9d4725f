//! Bridge session tests.

mod marshal_test;
mod session_test;
