//! Well-formedness violations.

use crate::core::PseudoStateKind;
use thiserror::Error;

/// How a violation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Sent to the sink's `warn`; evaluation can proceed.
    Warning,
    /// Sent to the sink's `error`; fatal by default.
    Error,
}

/// What is wrong with an element.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViolationKind {
    #[error("region has {count} initial vertices")]
    MultipleInitials { count: usize },

    #[error("{kind} has no outgoing transitions")]
    NoBranches { kind: PseudoStateKind },

    #[error("{kind} has {count} else transitions")]
    MultipleElse { kind: PseudoStateKind, count: usize },

    /// Only junctions and choices may have an else transition.
    #[error("{kind} cannot have an else transition")]
    UnexpectedElse { kind: PseudoStateKind },

    #[error("{kind} must have exactly one outgoing transition, found {count}")]
    InitialOutgoing { kind: PseudoStateKind, count: usize },

    #[error("{kind} transition cannot have a guard")]
    GuardedInitial { kind: PseudoStateKind },

    #[error("state has {count} regions named \"default\"")]
    DuplicateDefaultRegion { count: usize },

    #[error("final state cannot have outgoing transitions")]
    FinalWithOutgoing,

    #[error("final state cannot have regions")]
    FinalWithRegions,

    #[error("final state has entry or exit behavior that will still run")]
    FinalWithBehavior,

    #[error("local transition target {target} is not a descendant of its source")]
    LocalNotDescendant { target: String },
}

/// A violation found on a named element.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{element}: {kind}")]
pub struct Violation {
    pub severity: Severity,
    /// Qualified name of the offending element.
    pub element: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn error(element: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            severity: Severity::Error,
            element: element.into(),
            kind,
        }
    }

    pub fn warning(element: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            severity: Severity::Warning,
            element: element.into(),
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_element_and_problem() {
        let violation = Violation::error(
            "m.default.branch",
            ViolationKind::MultipleElse {
                kind: PseudoStateKind::Junction,
                count: 2,
            },
        );

        assert_eq!(
            violation.to_string(),
            "m.default.branch: junction has 2 else transitions"
        );
        assert!(violation.is_error());
    }

    #[test]
    fn warnings_are_not_errors() {
        let violation = Violation::warning("m.default.done", ViolationKind::FinalWithBehavior);

        assert_eq!(violation.severity, Severity::Warning);
        assert!(!violation.is_error());
    }
}
