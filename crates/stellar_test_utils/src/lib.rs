//! # Stellar Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture builders for carriers, stars and players
//! - Stub collaborators with call recording and failure injection
//! - Determinism harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod stubs;

/// Re-export proptest for convenience.
pub use proptest;
