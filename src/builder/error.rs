//! Build errors for model construction.

use crate::core::{RegionId, TransitionId, VertexId};
use thiserror::Error;

/// Errors that can occur when adding elements to a state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Vertex {0:?} does not belong to this state machine")]
    UnknownVertex(VertexId),

    #[error("Region {0:?} does not belong to this state machine")]
    UnknownRegion(RegionId),

    #[error("Transition {0:?} does not belong to this state machine")]
    UnknownTransition(TransitionId),

    #[error("Vertex '{0}' is not a state; only states own regions and entry/exit behavior")]
    NotAState(String),

    #[error("A vertex named '{name}' already exists in region '{region}'")]
    DuplicateName { region: String, name: String },

    #[error("Internal transition from '{from}' cannot target another vertex ('{to}')")]
    InternalTransitionTarget { from: String, to: String },
}
