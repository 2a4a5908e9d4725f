//! CLI tests.

mod command_test;
