//! Integration test utilities
//!
//! Builds full service contexts over the in-memory repository so the
//! resolution, verification, and projection flows can be exercised end to
//! end without a database or the membership portal.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
