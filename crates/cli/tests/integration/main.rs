//! CLI integration tests.

mod accounts_tests;
mod common;
mod report_tests;
