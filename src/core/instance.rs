//! Per-run storage of the active state configuration.
//!
//! An instance remembers, for every region it has entered, the last state that
//! was active there. The evaluator is the only writer; the entries of exited
//! regions are kept so that history pseudo-states can restore them.

use super::element::{RegionId, VertexId};
use std::collections::HashMap;
use uuid::Uuid;

/// Storage consulted and mutated by the evaluator.
///
/// Implement this for your own type to keep extended state next to the
/// configuration; guards and actions receive the concrete instance type.
pub trait Instance {
    /// Record `vertex` as the active vertex of `region`.
    fn set_current(&mut self, region: RegionId, vertex: VertexId);

    /// The last-known active vertex of `region`.
    fn get_current(&self, region: RegionId) -> Option<VertexId>;

    fn is_terminated(&self) -> bool;

    fn set_terminated(&mut self, terminated: bool);
}

/// In-memory instance keyed by region, carrying caller data `D`.
///
/// # Example
///
/// ```rust
/// use statetree::core::{Instance, MapInstance};
///
/// let mut instance: MapInstance<Vec<String>> = MapInstance::new();
/// instance.data.push("created".to_string());
///
/// assert!(!instance.is_terminated());
/// assert_eq!(instance.data.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct MapInstance<D = ()> {
    id: Uuid,
    current: HashMap<RegionId, VertexId>,
    terminated: bool,
    /// Extended state available to guards and actions.
    pub data: D,
}

impl<D: Default> MapInstance<D> {
    pub fn new() -> Self {
        Self::with_data(D::default())
    }
}

impl<D> MapInstance<D> {
    pub fn with_data(data: D) -> Self {
        Self {
            id: Uuid::new_v4(),
            current: HashMap::new(),
            terminated: false,
            data,
        }
    }

    /// Unique identity of this run.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Every region with a recorded vertex.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, VertexId)> + '_ {
        self.current.iter().map(|(region, vertex)| (*region, *vertex))
    }
}

impl<D: Default> Default for MapInstance<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Instance for MapInstance<D> {
    fn set_current(&mut self, region: RegionId, vertex: VertexId) {
        self.current.insert(region, vertex);
    }

    fn get_current(&self, region: RegionId) -> Option<VertexId> {
        self.current.get(&region).copied()
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn set_terminated(&mut self, terminated: bool) {
        self.terminated = terminated;
    }
}
