//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Key expression parsing tests
//! - Window scope resolution tests
//! - Collision detection tests
//! - Type tests (KeyStroke, ModifierMask, Target, etc.)

#[cfg(test)]
mod types_tests;
