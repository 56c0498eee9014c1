//! Well-formedness rules, one function per element type.
//!
//! Each rule yields one check per condition so that every violation found is
//! reported, not just the first.

use crate::core::{
    PseudoState, RegionId, State, StateMachine, TransitionId, TransitionKind, VertexId,
    DEFAULT_REGION_NAME,
};
use crate::validation::violations::{Violation, ViolationKind};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of a single rule.
pub type Check = Validation<(), NonEmptyVec<Violation>>;

fn ensure(holds: bool, violation: impl FnOnce() -> Violation) -> Check {
    if holds {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// A region has at most one initial vertex.
pub fn region<M, I>(machine: &StateMachine<M, I>, id: RegionId) -> Vec<Check> {
    let count = machine
        .region(id)
        .map(|region| {
            region
                .vertices()
                .iter()
                .filter(|vertex| machine.vertex(**vertex).is_some_and(|v| v.is_initial()))
                .count()
        })
        .unwrap_or_default();

    vec![ensure(count <= 1, || {
        Violation::error(
            machine.qualified_name(id),
            ViolationKind::MultipleInitials { count },
        )
    })]
}

/// Branches need somewhere to go and at most one fallback; other
/// pseudo-states have no fallback, and initial kinds have exactly one
/// unguarded way out.
pub fn pseudo_state<M, I>(
    machine: &StateMachine<M, I>,
    id: VertexId,
    pseudo: &PseudoState,
) -> Vec<Check> {
    let kind = pseudo.kind();
    let name = || machine.qualified_name(id);
    let outgoing: Vec<_> = machine
        .vertex(id)
        .map(|vertex| vertex.outgoing().to_vec())
        .unwrap_or_default();
    let else_count = outgoing
        .iter()
        .filter(|transition| machine.transition(**transition).is_some_and(|t| t.is_else()))
        .count();

    let mut checks = Vec::new();
    if kind.is_branch() {
        checks.push(ensure(!outgoing.is_empty(), || {
            Violation::error(name(), ViolationKind::NoBranches { kind })
        }));
        checks.push(ensure(else_count <= 1, || {
            Violation::error(
                name(),
                ViolationKind::MultipleElse {
                    kind,
                    count: else_count,
                },
            )
        }));
        return checks;
    }

    checks.push(ensure(else_count == 0, || {
        Violation::error(name(), ViolationKind::UnexpectedElse { kind })
    }));

    if kind.is_initial() {
        checks.push(ensure(outgoing.len() == 1, || {
            Violation::error(
                name(),
                ViolationKind::InitialOutgoing {
                    kind,
                    count: outgoing.len(),
                },
            )
        }));
        let guarded = outgoing.iter().any(|transition| {
            machine
                .transition(*transition)
                .is_some_and(|t| !t.guard().is_unconditional() && !t.is_else())
        });
        checks.push(ensure(!guarded, || {
            Violation::error(name(), ViolationKind::GuardedInitial { kind })
        }));
    }

    checks
}

/// A state has at most one default region; final states are leaves with no
/// way out.
pub fn state<M, I>(machine: &StateMachine<M, I>, id: VertexId, state: &State<M, I>) -> Vec<Check> {
    let name = || machine.qualified_name(id);
    let defaults = state
        .regions()
        .iter()
        .filter(|region| {
            machine
                .region(**region)
                .is_some_and(|r| r.name() == DEFAULT_REGION_NAME)
        })
        .count();

    let mut checks = vec![ensure(defaults <= 1, || {
        Violation::error(
            name(),
            ViolationKind::DuplicateDefaultRegion { count: defaults },
        )
    })];

    if state.is_final_marker() {
        checks.push(ensure(state.is_final(), || {
            Violation::error(name(), ViolationKind::FinalWithOutgoing)
        }));
        checks.push(ensure(state.is_simple(), || {
            Violation::error(name(), ViolationKind::FinalWithRegions)
        }));
        checks.push(ensure(
            state.entry_behavior().is_empty() && state.exit_behavior().is_empty(),
            || Violation::warning(name(), ViolationKind::FinalWithBehavior),
        ));
    }

    checks
}

/// A local transition must stay inside its source.
pub fn transition<M, I>(machine: &StateMachine<M, I>, id: TransitionId) -> Vec<Check> {
    let Some(record) = machine.transition(id) else {
        return Vec::new();
    };
    let (TransitionKind::Local, Some(target)) = (record.kind(), record.target()) else {
        return Vec::new();
    };
    let source = record.source();

    vec![ensure(
        source != target && machine.is_ancestor(source, target),
        || {
            Violation::error(
                machine.qualified_name(source),
                ViolationKind::LocalNotDescendant {
                    target: machine.qualified_name(target),
                },
            )
        },
    )]
}

/// Whether any check failed with an error rather than a warning.
pub fn has_errors(checks: &[Check]) -> bool {
    checks.iter().any(|check| match check {
        Validation::Failure(violations) => violations.iter().any(Violation::is_error),
        Validation::Success(_) => false,
    })
}
