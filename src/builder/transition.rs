//! Builder for constructing transitions.

use crate::core::{Action, Guard, Trigger, TransitionKind, VertexId};
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// Pass the finished builder to
/// [`StateMachine::add_transition`](crate::core::StateMachine::add_transition),
/// which checks it against the model and attaches it to its source.
///
/// Without an explicit guard, a transition leaving a state is a completion
/// transition and one leaving a pseudo-state always fires.
pub struct TransitionBuilder<M, I> {
    pub(crate) source: VertexId,
    pub(crate) target: Option<VertexId>,
    pub(crate) kind: TransitionKind,
    pub(crate) guard: Option<Guard<M, I>>,
    pub(crate) effect: Vec<Action<M, I>>,
}

impl<M, I> TransitionBuilder<M, I> {
    /// Start a transition leaving `source`.
    pub fn new(source: VertexId) -> Self {
        Self {
            source,
            target: None,
            kind: TransitionKind::External,
            guard: None,
            effect: Vec::new(),
        }
    }

    /// Set the target vertex; without one the transition is internal.
    pub fn to(mut self, target: VertexId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn kind(mut self, kind: TransitionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Shorthand for `.kind(TransitionKind::Local)`.
    pub fn local(self) -> Self {
        self.kind(TransitionKind::Local)
    }

    /// Set the guard.
    pub fn guard(mut self, guard: Guard<M, I>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Guard the transition with a predicate.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Trigger<'_, M>, &I) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Fire only for a message equal to `message`.
    pub fn on(self, message: M) -> Self
    where
        M: PartialEq + Send + Sync + 'static,
        I: 'static,
    {
        self.guard(Guard::on(message))
    }

    /// Make this the else-branch of a choice or junction.
    pub fn otherwise(self) -> Self {
        self.guard(Guard::Else)
    }

    /// Append an effect action, run between exit and entry.
    pub fn effect<F>(mut self, action: F) -> Self
    where
        F: Fn(&Trigger<'_, M>, &mut I) + Send + Sync + 'static,
    {
        self.effect.push(Arc::new(action));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_external_without_guard() {
        let builder: TransitionBuilder<&str, ()> = TransitionBuilder::new(VertexId(1));

        assert_eq!(builder.kind, TransitionKind::External);
        assert!(builder.target.is_none());
        assert!(builder.guard.is_none());
        assert!(builder.effect.is_empty());
    }

    #[test]
    fn fluent_api_collects_parts() {
        let builder: TransitionBuilder<&str, ()> = TransitionBuilder::new(VertexId(1))
            .to(VertexId(2))
            .local()
            .on("go")
            .effect(|_, _| {})
            .effect(|_, _| {});

        assert_eq!(builder.target, Some(VertexId(2)));
        assert_eq!(builder.kind, TransitionKind::Local);
        assert!(matches!(builder.guard, Some(Guard::When(_))));
        assert_eq!(builder.effect.len(), 2);
    }

    #[test]
    fn otherwise_marks_else_branch() {
        let builder: TransitionBuilder<&str, ()> =
            TransitionBuilder::new(VertexId(1)).to(VertexId(2)).otherwise();

        assert!(builder.guard.as_ref().is_some_and(Guard::is_else));
    }

    #[test]
    fn later_guard_replaces_earlier() {
        let builder: TransitionBuilder<&str, ()> = TransitionBuilder::new(VertexId(1))
            .otherwise()
            .when(|_, _| true);

        assert!(matches!(builder.guard, Some(Guard::When(_))));
    }
}
