//! Error types for combat resolution.
//!
//! Inputs are validated by the caller before a location is resolved, so the
//! core itself only fails when a collaborator does. Rounds that completed
//! before a failure keep their mutations; nothing is rolled back.

use thiserror::Error;

use crate::components::PlayerId;

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

/// Top-level error type for combat resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// A player referenced by a carrier or star is unknown to the directory.
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// An external collaborator rejected a call.
    #[error("{service} failed: {message}")]
    Collaborator {
        /// Collaborator that failed (e.g. "reputation", "star capture").
        service: &'static str,
        /// Error message reported by the collaborator.
        message: String,
    },

    /// Invalid battlefield state.
    #[error("Invalid combat state: {0}")]
    InvalidState(String),
}

impl CombatError {
    /// Convenience constructor for collaborator failures.
    pub fn collaborator(service: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            service,
            message: message.into(),
        }
    }
}
