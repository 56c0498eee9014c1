//! Compiled action sequences.

use crate::core::{Action, PseudoStateKind, RegionId, TransitionId, VertexId};
use std::fmt;
use std::sync::Arc;

/// One step of a compiled sequence.
///
/// Most steps are fully resolved at compile time; the ones that depend on an
/// instance (which vertex is active, which history to restore) carry just
/// enough data for the evaluator to decide at runtime.
pub(crate) enum Step<M, I> {
    /// Forward a message to the diagnostic sink's `log`.
    Trace(Arc<str>),
    /// Run an author-supplied action.
    Run(Action<M, I>),
    /// Record `state` as the active vertex of `region`.
    SetCurrent { region: RegionId, state: VertexId },
    /// Mark the instance terminated.
    Terminate,
    /// Leave whichever vertex is active in the region.
    LeaveRegion(RegionId),
    /// Enter the region through history or its initial vertex.
    EnterRegion {
        region: RegionId,
        initial: Option<VertexId>,
        initial_kind: Option<PseudoStateKind>,
    },
    /// Traverse the single outgoing transition of an initial pseudo-state.
    TraverseInitial(TransitionId),
    /// Local transition into a descendant of its source: the first entry whose
    /// vertex is inactive runs.
    Local(Vec<LocalEntry<M, I>>),
}

/// Candidate continuation of a local transition.
pub(crate) struct LocalEntry<M, I> {
    pub(crate) region: RegionId,
    pub(crate) vertex: VertexId,
    pub(crate) steps: Vec<Step<M, I>>,
}

impl<M, I> Clone for Step<M, I> {
    fn clone(&self) -> Self {
        match self {
            Step::Trace(message) => Step::Trace(Arc::clone(message)),
            Step::Run(action) => Step::Run(Arc::clone(action)),
            Step::SetCurrent { region, state } => Step::SetCurrent {
                region: *region,
                state: *state,
            },
            Step::Terminate => Step::Terminate,
            Step::LeaveRegion(region) => Step::LeaveRegion(*region),
            Step::EnterRegion {
                region,
                initial,
                initial_kind,
            } => Step::EnterRegion {
                region: *region,
                initial: *initial,
                initial_kind: *initial_kind,
            },
            Step::TraverseInitial(transition) => Step::TraverseInitial(*transition),
            Step::Local(entries) => Step::Local(entries.clone()),
        }
    }
}

impl<M, I> Clone for LocalEntry<M, I> {
    fn clone(&self) -> Self {
        Self {
            region: self.region,
            vertex: self.vertex,
            steps: self.steps.clone(),
        }
    }
}

impl<M, I> fmt::Debug for Step<M, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Trace(message) => write!(f, "Trace({message})"),
            Step::Run(_) => f.write_str("Run"),
            Step::SetCurrent { region, state } => {
                write!(f, "SetCurrent({}, {})", region.index(), state.index())
            }
            Step::Terminate => f.write_str("Terminate"),
            Step::LeaveRegion(region) => write!(f, "LeaveRegion({})", region.index()),
            Step::EnterRegion { region, .. } => write!(f, "EnterRegion({})", region.index()),
            Step::TraverseInitial(transition) => {
                write!(f, "TraverseInitial({})", transition.index())
            }
            Step::Local(entries) => write!(f, "Local({})", entries.len()),
        }
    }
}

/// The three sequences compiled for every region and vertex.
///
/// Entering an element is `begin_enter` followed by `end_enter`; transitions
/// splice the two halves separately so that entry can cascade down a path of
/// ancestors before the target's own children are entered.
pub(crate) struct ElementBehavior<M, I> {
    pub(crate) leave: Vec<Step<M, I>>,
    pub(crate) begin_enter: Vec<Step<M, I>>,
    pub(crate) end_enter: Vec<Step<M, I>>,
}

impl<M, I> ElementBehavior<M, I> {
    pub(crate) fn enter(&self) -> Vec<Step<M, I>> {
        let mut steps = self.begin_enter.clone();
        steps.extend(self.end_enter.iter().cloned());
        steps
    }
}

impl<M, I> Default for ElementBehavior<M, I> {
    fn default() -> Self {
        Self {
            leave: Vec::new(),
            begin_enter: Vec::new(),
            end_enter: Vec::new(),
        }
    }
}

/// Everything the evaluator needs, indexed by element id.
pub(crate) struct Compiled<M, I> {
    pub(crate) regions: Vec<ElementBehavior<M, I>>,
    pub(crate) vertices: Vec<ElementBehavior<M, I>>,
    pub(crate) traverse: Vec<Vec<Step<M, I>>>,
    pub(crate) on_initialise: Vec<Step<M, I>>,
}

impl<M, I> Default for Compiled<M, I> {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            vertices: Vec::new(),
            traverse: Vec::new(),
            on_initialise: Vec::new(),
        }
    }
}
