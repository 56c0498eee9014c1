//! Well-formedness checks for a model tree.
//!
//! [`check`] walks the whole model and accumulates every violation with
//! Stillwater's `Validation` instead of stopping at the first one.
//! [`validate`] runs the same walk and reports through a
//! [`Context`]'s diagnostic sink: warnings to `warn`, errors to `error`.
//!
//! # Example
//!
//! ```rust
//! use statetree::core::{MapInstance, PseudoStateKind, StateMachine};
//! use statetree::runtime::{Context, MachineError};
//! use statetree::validation::{check, validate};
//!
//! let mut machine: StateMachine<&str, MapInstance> = StateMachine::new("m");
//! let root = machine.root();
//! // A junction with nowhere to go.
//! machine.add_pseudo_state(root, "junction", PseudoStateKind::Junction).unwrap();
//!
//! assert!(check(&machine).is_failure());
//! assert!(matches!(
//!     validate(&machine, &Context::new()),
//!     Err(MachineError::IllFormed(_))
//! ));
//! ```

pub mod rules;
pub mod violations;

pub use rules::Check;
pub use violations::{Severity, Violation, ViolationKind};

use crate::core::{StateMachine, Vertex};
use crate::runtime::{Context, MachineError};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

fn checks<M, I>(machine: &StateMachine<M, I>) -> Vec<Check> {
    let mut checks = Vec::new();

    for (id, _) in machine.regions() {
        checks.extend(rules::region(machine, id));
    }
    for (id, vertex) in machine.vertices() {
        match vertex {
            Vertex::PseudoState(pseudo) => checks.extend(rules::pseudo_state(machine, id, pseudo)),
            Vertex::State(state) => checks.extend(rules::state(machine, id, state)),
        }
    }
    for (id, _) in machine.transitions() {
        checks.extend(rules::transition(machine, id));
    }

    checks
}

/// Check every rule, accumulating ALL violations, warnings included.
pub fn check<M, I>(machine: &StateMachine<M, I>) -> Validation<(), NonEmptyVec<Violation>> {
    Validation::all_vec(checks(machine)).map(|_| ())
}

/// True when no rule fails with an error; warnings are allowed.
pub fn is_well_formed<M, I>(machine: &StateMachine<M, I>) -> bool {
    !rules::has_errors(&checks(machine))
}

/// Report every violation through the context's diagnostic sink.
///
/// Returns the first error the sink chooses not to swallow.
pub fn validate<M, I>(machine: &StateMachine<M, I>, context: &Context) -> Result<(), MachineError> {
    let Validation::Failure(violations) = check(machine) else {
        return Ok(());
    };

    let diagnostics = context.diagnostics();
    for violation in violations.iter() {
        match violation.severity {
            Severity::Warning => diagnostics.warn(&violation.to_string()),
            Severity::Error => diagnostics.error(MachineError::IllFormed(violation.clone()))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::transition;
    use crate::core::{MapInstance, PseudoStateKind};
    use crate::runtime::Diagnostics;
    use std::sync::{Arc, Mutex};

    type Machine = StateMachine<&'static str, MapInstance>;

    #[derive(Default)]
    struct Collecting {
        warnings: Mutex<Vec<String>>,
        errors: Mutex<Vec<MachineError>>,
    }

    impl Diagnostics for Collecting {
        fn warn(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }

        fn error(&self, error: MachineError) -> Result<(), MachineError> {
            self.errors.lock().unwrap().push(error);
            Ok(())
        }
    }

    fn well_formed() -> Machine {
        let mut machine = Machine::new("m");
        let root = machine.root();
        let initial = machine
            .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
            .unwrap();
        let a = machine.add_state(root, "a").unwrap();
        let done = machine.add_final_state(root, "done").unwrap();
        machine.add_transition(transition(initial, a)).unwrap();
        machine.add_transition(transition(a, done).on("finish")).unwrap();
        machine
    }

    #[test]
    fn well_formed_machine_passes() {
        let machine = well_formed();

        assert!(check(&machine).is_success());
        assert!(is_well_formed(&machine));
        assert!(validate(&machine, &Context::new()).is_ok());
    }

    #[test]
    fn check_accumulates_all_violations() {
        let mut machine = well_formed();
        let root = machine.root();
        machine
            .add_pseudo_state(root, "second", PseudoStateKind::DeepHistory)
            .unwrap();
        machine
            .add_pseudo_state(root, "junction", PseudoStateKind::Junction)
            .unwrap();

        match check(&machine) {
            Validation::Failure(violations) => {
                // Two initials in the root region, a history with no way out,
                // and a junction with no branches.
                assert_eq!(violations.len(), 3);
                assert!(violations
                    .iter()
                    .any(|v| matches!(v.kind, ViolationKind::MultipleInitials { count: 2 })));
                assert!(violations
                    .iter()
                    .any(|v| matches!(v.kind, ViolationKind::InitialOutgoing { count: 0, .. })));
                assert!(violations
                    .iter()
                    .any(|v| matches!(v.kind, ViolationKind::NoBranches { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn validate_routes_by_severity() {
        let mut machine = well_formed();
        let done = machine.find_vertex("m.default.done").unwrap();
        machine.on_entry(done, |_, _| {}).unwrap();
        let root = machine.root();
        machine
            .add_pseudo_state(root, "junction", PseudoStateKind::Junction)
            .unwrap();

        let sink = Arc::new(Collecting::default());
        let context = Context::new().with_diagnostics(sink.clone());

        assert!(validate(&machine, &context).is_ok());
        assert_eq!(sink.warnings.lock().unwrap().len(), 1);
        assert_eq!(sink.errors.lock().unwrap().len(), 1);
        assert!(!is_well_formed(&machine));
    }

    #[test]
    fn default_sink_stops_at_first_error() {
        let mut machine = well_formed();
        let root = machine.root();
        machine
            .add_pseudo_state(root, "junction", PseudoStateKind::Junction)
            .unwrap();

        let result = validate(&machine, &Context::new());

        assert!(matches!(
            result,
            Err(MachineError::IllFormed(Violation {
                kind: ViolationKind::NoBranches { .. },
                ..
            }))
        ));
    }
}
