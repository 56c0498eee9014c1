//! Builder API for ergonomic transition construction.
//!
//! States, regions and pseudo-states are added directly on the
//! [`StateMachine`](crate::core::StateMachine); transitions carry enough optional
//! parts (target, kind, guard, effects) to warrant a fluent builder.

pub mod error;
pub mod transition;

pub use error::BuildError;
pub use transition::TransitionBuilder;

use crate::core::VertexId;

/// Start a transition from `source` to `target`.
///
/// # Example
///
/// ```
/// use statetree::builder::transition;
/// use statetree::core::{MapInstance, StateMachine};
///
/// let mut machine: StateMachine<&str, MapInstance> = StateMachine::new("door");
/// let root = machine.root();
/// let open = machine.add_state(root, "open").unwrap();
/// let closed = machine.add_state(root, "closed").unwrap();
///
/// machine.add_transition(transition(open, closed).on("close")).unwrap();
/// ```
pub fn transition<M, I>(source: VertexId, target: VertexId) -> TransitionBuilder<M, I> {
    TransitionBuilder::new(source).to(target)
}

/// Start an internal transition on `source`; only its effects run.
pub fn internal<M, I>(source: VertexId) -> TransitionBuilder<M, I> {
    TransitionBuilder::new(source)
}
