//! Display module tests
//!
//! Contains test suites for the collaborator implementations:
//! - Virtual display tests
//! - Shell feed tests
