//! Config module tests
//!
//! Contains test suites for rule loading:
//! - Rule file parser tests
//! - Config model and loader tests
//! - Settings tests
//! - Watcher tests
