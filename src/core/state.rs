//! Regions and vertices of the model tree.
//!
//! Ownership is strictly tree-shaped: a state owns its regions, a region owns
//! its vertices. Transitions are referenced by id from both ends.

use super::element::{PseudoStateKind, RegionId, TransitionId, VertexId};
use super::guard::Action;

/// A container of vertices owned by a state; at most one of its vertices is
/// active at a time.
#[derive(Clone, Debug)]
pub struct Region {
    pub(crate) name: String,
    pub(crate) parent: VertexId,
    pub(crate) vertices: Vec<VertexId>,
}

impl Region {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state owning this region.
    pub fn parent(&self) -> VertexId {
        self.parent
    }

    /// Vertices in declaration order.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }
}

/// A transient vertex: entry points, branches and termination.
#[derive(Clone, Debug)]
pub struct PseudoState {
    pub(crate) name: String,
    pub(crate) parent: RegionId,
    pub(crate) kind: PseudoStateKind,
    pub(crate) outgoing: Vec<TransitionId>,
    pub(crate) incoming: Vec<TransitionId>,
}

impl PseudoState {
    pub fn kind(&self) -> PseudoStateKind {
        self.kind
    }

    pub fn is_initial(&self) -> bool {
        self.kind.is_initial()
    }

    pub fn is_history(&self) -> bool {
        self.kind.is_history()
    }
}

/// A state, possibly composite (one region) or orthogonal (several).
///
/// The root state machine is a state without a parent region.
pub struct State<M, I> {
    pub(crate) name: String,
    pub(crate) parent: Option<RegionId>,
    pub(crate) regions: Vec<RegionId>,
    pub(crate) entry: Vec<Action<M, I>>,
    pub(crate) exit: Vec<Action<M, I>>,
    pub(crate) final_marker: bool,
    pub(crate) outgoing: Vec<TransitionId>,
    pub(crate) incoming: Vec<TransitionId>,
}

impl<M, I> State<M, I> {
    pub(crate) fn new(name: String, parent: Option<RegionId>) -> Self {
        Self {
            name,
            parent,
            regions: Vec::new(),
            entry: Vec::new(),
            exit: Vec::new(),
            final_marker: false,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Child regions in declaration order.
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    pub fn entry_behavior(&self) -> &[Action<M, I>] {
        &self.entry
    }

    pub fn exit_behavior(&self) -> &[Action<M, I>] {
        &self.exit
    }

    pub fn is_simple(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        !self.regions.is_empty()
    }

    pub fn is_orthogonal(&self) -> bool {
        self.regions.len() > 1
    }

    /// A state with no outgoing transitions.
    pub fn is_final(&self) -> bool {
        self.outgoing.is_empty()
    }

    /// Whether the state was declared as a final state marker.
    pub fn is_final_marker(&self) -> bool {
        self.final_marker
    }
}

/// Either kind of vertex.
pub enum Vertex<M, I> {
    PseudoState(PseudoState),
    State(State<M, I>),
}

impl<M, I> Vertex<M, I> {
    pub fn name(&self) -> &str {
        match self {
            Vertex::PseudoState(pseudo) => &pseudo.name,
            Vertex::State(state) => &state.name,
        }
    }

    /// The region owning this vertex; `None` only for the root.
    pub fn parent(&self) -> Option<RegionId> {
        match self {
            Vertex::PseudoState(pseudo) => Some(pseudo.parent),
            Vertex::State(state) => state.parent,
        }
    }

    pub fn outgoing(&self) -> &[TransitionId] {
        match self {
            Vertex::PseudoState(pseudo) => &pseudo.outgoing,
            Vertex::State(state) => &state.outgoing,
        }
    }

    pub fn incoming(&self) -> &[TransitionId] {
        match self {
            Vertex::PseudoState(pseudo) => &pseudo.incoming,
            Vertex::State(state) => &state.incoming,
        }
    }

    pub fn as_state(&self) -> Option<&State<M, I>> {
        match self {
            Vertex::State(state) => Some(state),
            Vertex::PseudoState(_) => None,
        }
    }

    pub fn as_pseudo_state(&self) -> Option<&PseudoState> {
        match self {
            Vertex::PseudoState(pseudo) => Some(pseudo),
            Vertex::State(_) => None,
        }
    }

    /// Kind of the pseudo-state, if this vertex is one.
    pub fn pseudo_kind(&self) -> Option<PseudoStateKind> {
        self.as_pseudo_state().map(PseudoState::kind)
    }

    pub fn is_initial(&self) -> bool {
        self.pseudo_kind().is_some_and(PseudoStateKind::is_initial)
    }

    /// Only states can be final; pseudo-states are transient.
    pub fn is_final(&self) -> bool {
        self.as_state().is_some_and(State::is_final)
    }

    pub(crate) fn outgoing_mut(&mut self) -> &mut Vec<TransitionId> {
        match self {
            Vertex::PseudoState(pseudo) => &mut pseudo.outgoing,
            Vertex::State(state) => &mut state.outgoing,
        }
    }

    pub(crate) fn incoming_mut(&mut self) -> &mut Vec<TransitionId> {
        match self {
            Vertex::PseudoState(pseudo) => &mut pseudo.incoming,
            Vertex::State(state) => &mut state.incoming,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Vertex::PseudoState(pseudo) => pseudo.name = name,
            Vertex::State(state) => state.name = name,
        }
    }
}
