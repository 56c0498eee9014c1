//! Statetree: a hierarchical state machine runtime
//!
//! Statetree follows a "compile once, evaluate many" design. A model is built
//! as a tree of regions, states and pseudo-states connected by guarded
//! transitions; the compiler flattens it into ordered action sequences; the
//! evaluator then runs those sequences for any number of independent
//! instances, each holding its own active configuration.
//!
//! # Core Concepts
//!
//! - **Model**: [`StateMachine`](core::StateMachine) owns every region, vertex
//!   and transition, addressed by copyable ids
//! - **Compiler**: [`compile`](compile::compile) precomputes entry, exit and
//!   traversal sequences
//! - **Runtime**: [`evaluate`](runtime::evaluate) dispatches messages
//!   depth-first over the active configuration
//! - **Validation**: [`validate`](validation::validate) reports UML
//!   well-formedness problems
//! - **Checkpoint**: [`Snapshot`](checkpoint::Snapshot) saves and restores a
//!   configuration by element names
//!
//! # Example
//!
//! ```rust
//! use statetree::builder::transition;
//! use statetree::core::{MapInstance, PseudoStateKind, StateMachine};
//! use statetree::runtime::{evaluate, initialise, Context};
//!
//! let mut machine: StateMachine<&str, MapInstance<u32>> = StateMachine::new("turnstile");
//! let root = machine.root();
//! let initial = machine.add_pseudo_state(root, "initial", PseudoStateKind::Initial).unwrap();
//! let locked = machine.add_state(root, "locked").unwrap();
//! let unlocked = machine.add_state(root, "unlocked").unwrap();
//!
//! machine.add_transition(transition(initial, locked)).unwrap();
//! machine
//!     .add_transition(
//!         transition(locked, unlocked)
//!             .on("coin")
//!             .effect(|_, instance: &mut MapInstance<u32>| instance.data += 1),
//!     )
//!     .unwrap();
//! machine.add_transition(transition(unlocked, locked).on("push")).unwrap();
//!
//! let mut context = Context::new();
//! let mut instance = MapInstance::new();
//! initialise(&mut machine, &mut instance, &mut context).unwrap();
//!
//! assert!(evaluate(&mut machine, &mut instance, &"coin", &mut context).unwrap());
//! assert!(machine.is_active(unlocked, &instance));
//! assert_eq!(instance.data, 1);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod compile;
pub mod core;
pub mod runtime;
pub mod validation;

// Re-export commonly used types
pub use builder::{transition, BuildError, TransitionBuilder};
pub use crate::core::{
    Guard, Instance, MapInstance, PseudoStateKind, StateMachine, TransitionKind, Trigger,
};
pub use runtime::{evaluate, initialise, Context, Diagnostics, MachineError};
