//! Model tree and transition graph.
//!
//! This module contains the structural data of a state machine:
//! - Element identities and kinds
//! - Regions, states and pseudo-states
//! - Transitions with their guards and effects
//! - The instance abstraction holding a run's active configuration
//!
//! Nothing here executes behavior; see [`compile`](crate::compile) and
//! [`runtime`](crate::runtime).

mod element;
mod guard;
mod instance;
mod machine;
mod state;
mod transition;

pub use element::{
    ElementId, Parent, PseudoStateKind, RegionId, TransitionId, TransitionKind, VertexId,
    DEFAULT_REGION_NAME, NAMESPACE_SEPARATOR,
};
pub use guard::{Action, Guard, Predicate, Trigger};
pub use instance::{Instance, MapInstance};
pub use machine::StateMachine;
pub use state::{PseudoState, Region, State, Vertex};
pub use transition::Transition;
