//! Transition records.

use super::element::{TransitionKind, VertexId};
use super::guard::{Action, Guard};

/// A transition between two vertices, or an internal transition on one.
pub struct Transition<M, I> {
    pub(crate) source: VertexId,
    pub(crate) target: Option<VertexId>,
    pub(crate) kind: TransitionKind,
    pub(crate) guard: Guard<M, I>,
    pub(crate) effect: Vec<Action<M, I>>,
}

impl<M, I> Transition<M, I> {
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// `None` for internal transitions.
    pub fn target(&self) -> Option<VertexId> {
        self.target
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn guard(&self) -> &Guard<M, I> {
        &self.guard
    }

    pub fn effect_behavior(&self) -> &[Action<M, I>] {
        &self.effect
    }

    pub fn is_else(&self) -> bool {
        self.guard.is_else()
    }
}
