//! Engine module tests
//!
//! Contains test suites for rule resolution and dispatch:
//! - Compiler and dispatch table tests
//! - Dispatch tests (subset matching, pass-through)
//! - Active window tracker tests
//! - Event handler tests (end-to-end scenarios)

#[cfg(test)]
mod compiler_tests;
#[cfg(test)]
mod dispatch_tests;
#[cfg(test)]
mod handler_tests;
