//! Runtime error types.

use crate::validation::Violation;
use thiserror::Error;

/// Errors reported through the diagnostic sink, or returned directly when the
/// machine cannot be evaluated at all.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    /// The model changed since it was last compiled and auto-compilation is off.
    #[error("State machine has not been compiled since its last change")]
    NotCompiled,

    #[error("{count} transitions are enabled from state {state}")]
    AmbiguousTransition { state: String, count: usize },

    #[error("{count} branches are enabled from junction {pseudo_state}")]
    AmbiguousBranch { pseudo_state: String, count: usize },

    /// No guard of a junction or choice is true and it has no else-branch.
    #[error("No branch is enabled from {pseudo_state} and it has no else transition")]
    NoBranch { pseudo_state: String },

    #[error("Ill-formed model: {0}")]
    IllFormed(Violation),
}
