//! Element identities and kinds.
//!
//! Every region, vertex and transition of a [`StateMachine`](super::StateMachine)
//! lives in an arena owned by the machine and is addressed by a small copyable
//! id. Ids are only meaningful for the machine that issued them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when joining ancestor names into a qualified name.
pub const NAMESPACE_SEPARATOR: &str = ".";

/// Name given to regions created implicitly when a vertex is added to a state.
pub const DEFAULT_REGION_NAME: &str = "default";

/// Identity of a region within its machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub(crate) usize);

/// Identity of a vertex (state or pseudo-state) within its machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub(crate) usize);

/// Identity of a transition within its machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(pub(crate) usize);

impl RegionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl TransitionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Either kind of element that can appear in an ancestor chain.
///
/// Chains alternate between vertices and regions, starting at the root
/// state machine: `[root, region, state, region, ..., vertex]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementId {
    Region(RegionId),
    Vertex(VertexId),
}

impl From<RegionId> for ElementId {
    fn from(id: RegionId) -> Self {
        ElementId::Region(id)
    }
}

impl From<VertexId> for ElementId {
    fn from(id: VertexId) -> Self {
        ElementId::Vertex(id)
    }
}

/// Where a new vertex is placed.
///
/// A state parent means "the state's default region", created on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parent {
    Region(RegionId),
    State(VertexId),
}

impl From<RegionId> for Parent {
    fn from(id: RegionId) -> Self {
        Parent::Region(id)
    }
}

impl From<VertexId> for Parent {
    fn from(id: VertexId) -> Self {
        Parent::State(id)
    }
}

/// The closed set of pseudo-state kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PseudoStateKind {
    /// Dynamic conditional branch; picks randomly among true guards.
    Choice,
    /// Static conditional branch; exactly one guard may be true.
    Junction,
    /// Default entry point of a region.
    Initial,
    /// Entry point restoring the region's last active state.
    ShallowHistory,
    /// Entry point restoring the last active configuration of the whole subtree.
    DeepHistory,
    /// Entering it terminates the instance.
    Terminate,
}

impl PseudoStateKind {
    pub fn is_initial(self) -> bool {
        matches!(
            self,
            Self::Initial | Self::ShallowHistory | Self::DeepHistory
        )
    }

    pub fn is_history(self) -> bool {
        matches!(self, Self::ShallowHistory | Self::DeepHistory)
    }

    /// Choice and junction resolve an outgoing transition when traversed into.
    pub fn is_branch(self) -> bool {
        matches!(self, Self::Choice | Self::Junction)
    }
}

impl fmt::Display for PseudoStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Choice => "choice",
            Self::Junction => "junction",
            Self::Initial => "initial",
            Self::ShallowHistory => "shallow history",
            Self::DeepHistory => "deep history",
            Self::Terminate => "terminate",
        };
        f.write_str(name)
    }
}

/// How much of the ancestor chain a transition exits and enters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Exits the source (up to the common ancestor) and enters the target.
    #[default]
    External,
    /// Runs the effect only; the active configuration is untouched.
    Internal,
    /// Does not exit the source when the target is one of its descendants.
    Local,
}
