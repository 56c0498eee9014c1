//! Triggers, guards and actions.
//!
//! Guards are pure predicates that decide whether a transition may fire for a
//! given trigger; actions are the author-supplied callbacks run on entry, exit
//! and transition traversal.

use super::element::VertexId;
use std::fmt;
use std::sync::Arc;

/// What caused the evaluator to run a sequence.
///
/// `Completion(state)` is the sentinel used to evaluate a state's completion
/// transitions once every one of its regions has reached a final state.
pub enum Trigger<'a, M> {
    /// Initial entry of the machine.
    Initialise,
    /// A message passed to `evaluate`.
    Message(&'a M),
    /// The given state has become complete.
    Completion(VertexId),
}

impl<'a, M> Trigger<'a, M> {
    /// The message, if this trigger carries one.
    pub fn message(&self) -> Option<&'a M> {
        match self {
            Trigger::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_completion_of(&self, state: VertexId) -> bool {
        matches!(self, Trigger::Completion(s) if *s == state)
    }
}

impl<M> Clone for Trigger<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Trigger<'_, M> {}

impl<M: fmt::Debug> fmt::Debug for Trigger<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Initialise => f.write_str("Initialise"),
            Trigger::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Trigger::Completion(state) => f.debug_tuple("Completion").field(state).finish(),
        }
    }
}

/// Entry, exit or effect callback.
pub type Action<M, I> = Arc<dyn Fn(&Trigger<'_, M>, &mut I) + Send + Sync>;

/// Guard predicate over the trigger and the instance.
pub type Predicate<M, I> = Arc<dyn Fn(&Trigger<'_, M>, &I) -> bool + Send + Sync>;

/// Condition under which a transition may fire.
///
/// # Example
///
/// ```rust
/// use statetree::core::{Guard, MapInstance, StateMachine, Trigger};
///
/// let machine: StateMachine<&str, MapInstance> = StateMachine::new("m");
/// let instance = MapInstance::new();
/// let source = machine.root();
///
/// let guard: Guard<&str, MapInstance> = Guard::on("go");
///
/// assert!(guard.check(source, &Trigger::Message(&"go"), &instance));
/// assert!(!guard.check(source, &Trigger::Message(&"stop"), &instance));
/// assert!(!guard.check(source, &Trigger::Completion(source), &instance));
/// ```
pub enum Guard<M, I> {
    /// Fires only on the completion sentinel of the transition's source.
    Completion,
    /// Always true.
    Always,
    /// The else-branch of a choice or junction; never true on its own.
    Else,
    /// Author-supplied predicate.
    When(Predicate<M, I>),
}

impl<M, I> Guard<M, I> {
    /// Create a guard from a pure predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Trigger<'_, M>, &I) -> bool + Send + Sync + 'static,
    {
        Guard::When(Arc::new(predicate))
    }

    /// Guard that is true when the trigger carries a message equal to `expected`.
    pub fn on(expected: M) -> Self
    where
        M: PartialEq + Send + Sync + 'static,
        I: 'static,
    {
        Guard::new(move |trigger: &Trigger<'_, M>, _: &I| trigger.message() == Some(&expected))
    }

    pub fn is_else(&self) -> bool {
        matches!(self, Guard::Else)
    }

    /// True unless the guard restricts when the transition fires.
    pub fn is_unconditional(&self) -> bool {
        matches!(self, Guard::Always)
    }

    /// Evaluate the guard for a transition leaving `source`.
    pub fn check(&self, source: VertexId, trigger: &Trigger<'_, M>, instance: &I) -> bool {
        match self {
            Guard::Completion => trigger.is_completion_of(source),
            Guard::Always => true,
            Guard::Else => false,
            Guard::When(predicate) => predicate(trigger, instance),
        }
    }
}

impl<M, I> Clone for Guard<M, I> {
    fn clone(&self) -> Self {
        match self {
            Guard::Completion => Guard::Completion,
            Guard::Always => Guard::Always,
            Guard::Else => Guard::Else,
            Guard::When(predicate) => Guard::When(Arc::clone(predicate)),
        }
    }
}

impl<M, I> fmt::Debug for Guard<M, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Completion => f.write_str("Completion"),
            Guard::Always => f.write_str("Always"),
            Guard::Else => f.write_str("Else"),
            Guard::When(_) => f.write_str("When(..)"),
        }
    }
}
