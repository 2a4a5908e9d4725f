//! Process module tests.

mod supervisor_test;
