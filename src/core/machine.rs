//! The state machine model: an arena of regions, vertices and transitions.

use super::element::{
    ElementId, Parent, PseudoStateKind, RegionId, TransitionId, TransitionKind, VertexId,
    DEFAULT_REGION_NAME, NAMESPACE_SEPARATOR,
};
use super::guard::{Action, Guard, Trigger};
use super::instance::Instance;
use super::state::{PseudoState, Region, State, Vertex};
use super::transition::Transition;
use crate::builder::{BuildError, TransitionBuilder};
use crate::compile::Compiled;
use std::sync::Arc;

/// Root of a model tree, owning every element of it.
///
/// `M` is the message type passed to `evaluate`, `I` the instance type that
/// guards and actions operate on. The root is itself a state (see
/// [`root`](Self::root)); regions and vertices are added beneath it.
///
/// Any structural change marks the machine dirty; it is recompiled before the
/// next evaluation.
///
/// # Example
///
/// ```rust
/// use statetree::core::{MapInstance, PseudoStateKind, StateMachine};
/// use statetree::builder::transition;
///
/// let mut machine: StateMachine<&str, MapInstance> = StateMachine::new("player");
/// let root = machine.root();
/// let initial = machine.add_pseudo_state(root, "initial", PseudoStateKind::Initial).unwrap();
/// let stopped = machine.add_state(root, "stopped").unwrap();
/// let playing = machine.add_state(root, "playing").unwrap();
///
/// machine.add_transition(transition(initial, stopped)).unwrap();
/// machine.add_transition(transition(stopped, playing).on("play")).unwrap();
///
/// assert_eq!(machine.qualified_name(playing), "player.default.playing");
/// assert!(!machine.is_clean());
/// ```
pub struct StateMachine<M, I> {
    regions: Vec<Region>,
    vertices: Vec<Vertex<M, I>>,
    transitions: Vec<Transition<M, I>>,
    clean: bool,
    pub(crate) compiled: Compiled<M, I>,
}

impl<M, I> StateMachine<M, I> {
    /// Create an empty machine whose root state is called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            regions: Vec::new(),
            vertices: vec![Vertex::State(State::new(name.into(), None))],
            transitions: Vec::new(),
            clean: false,
            compiled: Compiled::default(),
        }
    }

    /// The root state.
    pub fn root(&self) -> VertexId {
        VertexId(0)
    }

    pub fn name(&self) -> &str {
        self.vertices[0].name()
    }

    /// True only between a compile and the next structural change.
    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub(crate) fn mark_clean(&mut self) {
        self.clean = true;
    }

    fn mark_dirty(&mut self) {
        self.clean = false;
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex<M, I>> {
        self.vertices.get(id.0)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition<M, I>> {
        self.transitions.get(id.0)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex<M, I>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(index, vertex)| (VertexId(index), vertex))
    }

    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.regions
            .iter()
            .enumerate()
            .map(|(index, region)| (RegionId(index), region))
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition<M, I>)> + '_ {
        self.transitions
            .iter()
            .enumerate()
            .map(|(index, transition)| (TransitionId(index), transition))
    }

    // Ids issued by this machine always index its arenas.
    pub(crate) fn vertex_at(&self, id: VertexId) -> &Vertex<M, I> {
        &self.vertices[id.0]
    }

    pub(crate) fn region_at(&self, id: RegionId) -> &Region {
        &self.regions[id.0]
    }

    pub(crate) fn transition_at(&self, id: TransitionId) -> &Transition<M, I> {
        &self.transitions[id.0]
    }

    fn state_mut(&mut self, id: VertexId) -> Result<&mut State<M, I>, BuildError> {
        match self.vertices.get_mut(id.0) {
            Some(Vertex::State(state)) => Ok(state),
            Some(vertex) => Err(BuildError::NotAState(vertex.name().to_string())),
            None => Err(BuildError::UnknownVertex(id)),
        }
    }

    /// Add a named region to a state.
    pub fn add_region(
        &mut self,
        state: VertexId,
        name: impl Into<String>,
    ) -> Result<RegionId, BuildError> {
        let id = RegionId(self.regions.len());
        self.state_mut(state)?.regions.push(id);
        self.regions.push(Region {
            name: name.into(),
            parent: state,
            vertices: Vec::new(),
        });
        self.mark_dirty();
        Ok(id)
    }

    /// The state's region named [`DEFAULT_REGION_NAME`], created if missing.
    pub fn default_region(&mut self, state: VertexId) -> Result<RegionId, BuildError> {
        let existing = self
            .state_mut(state)?
            .regions
            .clone()
            .into_iter()
            .find(|region| self.regions[region.0].name == DEFAULT_REGION_NAME);

        match existing {
            Some(region) => Ok(region),
            None => self.add_region(state, DEFAULT_REGION_NAME),
        }
    }

    fn resolve_parent(&mut self, parent: Parent) -> Result<RegionId, BuildError> {
        match parent {
            Parent::Region(region) if region.0 < self.regions.len() => Ok(region),
            Parent::Region(region) => Err(BuildError::UnknownRegion(region)),
            Parent::State(state) => self.default_region(state),
        }
    }

    fn push_vertex(&mut self, region: RegionId, vertex: Vertex<M, I>) -> Result<VertexId, BuildError> {
        let siblings = &self.regions[region.0];
        if siblings
            .vertices
            .iter()
            .any(|sibling| self.vertices[sibling.0].name() == vertex.name())
        {
            return Err(BuildError::DuplicateName {
                region: siblings.name.clone(),
                name: vertex.name().to_string(),
            });
        }

        let id = VertexId(self.vertices.len());
        self.vertices.push(vertex);
        self.regions[region.0].vertices.push(id);
        self.mark_dirty();
        Ok(id)
    }

    /// Add a state to a region, or to a state's default region.
    pub fn add_state(
        &mut self,
        parent: impl Into<Parent>,
        name: impl Into<String>,
    ) -> Result<VertexId, BuildError> {
        let region = self.resolve_parent(parent.into())?;
        self.push_vertex(region, Vertex::State(State::new(name.into(), Some(region))))
    }

    /// Add a state marking the completion of its region.
    pub fn add_final_state(
        &mut self,
        parent: impl Into<Parent>,
        name: impl Into<String>,
    ) -> Result<VertexId, BuildError> {
        let region = self.resolve_parent(parent.into())?;
        let mut state = State::new(name.into(), Some(region));
        state.final_marker = true;
        self.push_vertex(region, Vertex::State(state))
    }

    pub fn add_pseudo_state(
        &mut self,
        parent: impl Into<Parent>,
        name: impl Into<String>,
        kind: PseudoStateKind,
    ) -> Result<VertexId, BuildError> {
        let region = self.resolve_parent(parent.into())?;
        let pseudo = PseudoState {
            name: name.into(),
            parent: region,
            kind,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        };
        self.push_vertex(region, Vertex::PseudoState(pseudo))
    }

    /// Append an action run when `state` is entered.
    pub fn on_entry<F>(&mut self, state: VertexId, action: F) -> Result<(), BuildError>
    where
        F: Fn(&Trigger<'_, M>, &mut I) + Send + Sync + 'static,
    {
        let action: Action<M, I> = Arc::new(action);
        self.state_mut(state)?.entry.push(action);
        self.mark_dirty();
        Ok(())
    }

    /// Append an action run when `state` is exited.
    pub fn on_exit<F>(&mut self, state: VertexId, action: F) -> Result<(), BuildError>
    where
        F: Fn(&Trigger<'_, M>, &mut I) + Send + Sync + 'static,
    {
        let action: Action<M, I> = Arc::new(action);
        self.state_mut(state)?.exit.push(action);
        self.mark_dirty();
        Ok(())
    }

    /// Attach a transition built with [`TransitionBuilder`] to its source.
    pub fn add_transition(
        &mut self,
        builder: TransitionBuilder<M, I>,
    ) -> Result<TransitionId, BuildError> {
        let source = builder.source;
        let source_vertex = self
            .vertex(source)
            .ok_or(BuildError::UnknownVertex(source))?;
        if let Some(target) = builder.target {
            self.vertex(target)
                .ok_or(BuildError::UnknownVertex(target))?;
        }

        let (kind, target) = match (builder.kind, builder.target) {
            (_, None) => (TransitionKind::Internal, None),
            (TransitionKind::Internal, Some(target)) if target == source => {
                (TransitionKind::Internal, None)
            }
            (TransitionKind::Internal, Some(target)) => {
                return Err(BuildError::InternalTransitionTarget {
                    from: self.qualified_name(source),
                    to: self.qualified_name(target),
                });
            }
            (kind, Some(target)) => (kind, Some(target)),
        };

        let guard = builder.guard.unwrap_or(match source_vertex {
            Vertex::PseudoState(_) => Guard::Always,
            Vertex::State(_) => Guard::Completion,
        });

        let id = TransitionId(self.transitions.len());
        self.transitions.push(Transition {
            source,
            target,
            kind,
            guard,
            effect: builder.effect,
        });
        self.vertices[source.0].outgoing_mut().push(id);
        if let Some(target) = target {
            self.vertices[target.0].incoming_mut().push(id);
        }
        self.mark_dirty();
        Ok(id)
    }

    /// Append an effect to an existing transition.
    pub fn add_effect<F>(&mut self, transition: TransitionId, action: F) -> Result<(), BuildError>
    where
        F: Fn(&Trigger<'_, M>, &mut I) + Send + Sync + 'static,
    {
        let record = self
            .transitions
            .get_mut(transition.0)
            .ok_or(BuildError::UnknownTransition(transition))?;
        record.effect.push(Arc::new(action));
        self.mark_dirty();
        Ok(())
    }

    /// Rename a vertex; qualified names of its descendants change with it.
    pub fn rename(&mut self, vertex: VertexId, name: impl Into<String>) -> Result<(), BuildError> {
        let name = name.into();
        let parent = self
            .vertex(vertex)
            .ok_or(BuildError::UnknownVertex(vertex))?
            .parent();

        if let Some(region) = parent {
            let siblings = &self.regions[region.0];
            if siblings
                .vertices
                .iter()
                .any(|sibling| *sibling != vertex && self.vertices[sibling.0].name() == name)
            {
                return Err(BuildError::DuplicateName {
                    region: siblings.name.clone(),
                    name,
                });
            }
        }

        self.vertices[vertex.0].set_name(name);
        self.mark_dirty();
        Ok(())
    }

    /// Root-to-vertex chain, alternating vertices and regions.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` was not created by this machine. The same holds for
    /// the other queries taking ids: [`element_name`](Self::element_name),
    /// [`qualified_name`](Self::qualified_name),
    /// [`is_ancestor`](Self::is_ancestor), [`is_active`](Self::is_active) and
    /// [`is_complete`](Self::is_complete).
    pub fn ancestors(&self, vertex: VertexId) -> Vec<ElementId> {
        let mut chain = vec![ElementId::Vertex(vertex)];
        let mut current = vertex;
        while let Some(region) = self.vertices[current.0].parent() {
            current = self.regions[region.0].parent;
            chain.push(ElementId::Region(region));
            chain.push(ElementId::Vertex(current));
        }
        chain.reverse();
        chain
    }

    /// # Panics
    ///
    /// Panics if `element` was not created by this machine.
    pub fn element_name(&self, element: ElementId) -> &str {
        match element {
            ElementId::Region(region) => &self.regions[region.0].name,
            ElementId::Vertex(vertex) => self.vertices[vertex.0].name(),
        }
    }

    /// Ancestor names joined with [`NAMESPACE_SEPARATOR`].
    pub fn qualified_name(&self, element: impl Into<ElementId>) -> String {
        let element = element.into();
        let chain = match element {
            ElementId::Vertex(vertex) => self.ancestors(vertex),
            ElementId::Region(region) => {
                let mut chain = self.ancestors(self.regions[region.0].parent);
                chain.push(element);
                chain
            }
        };

        chain
            .into_iter()
            .map(|ancestor| self.element_name(ancestor))
            .collect::<Vec<_>>()
            .join(NAMESPACE_SEPARATOR)
    }

    pub fn find_vertex(&self, qualified_name: &str) -> Option<VertexId> {
        self.vertices()
            .map(|(id, _)| id)
            .find(|id| self.qualified_name(*id) == qualified_name)
    }

    pub fn find_region(&self, qualified_name: &str) -> Option<RegionId> {
        self.regions()
            .map(|(id, _)| id)
            .find(|id| self.qualified_name(*id) == qualified_name)
    }

    /// Whether `ancestor` appears on the chain from the root to `vertex`.
    pub fn is_ancestor(&self, ancestor: VertexId, vertex: VertexId) -> bool {
        self.ancestors(vertex).contains(&ElementId::Vertex(ancestor))
    }
}

impl<M, I: Instance> StateMachine<M, I> {
    /// Whether `vertex` and all its ancestors are active in `instance`.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` was not created by this machine, or if `instance`
    /// holds ids of another machine.
    pub fn is_active(&self, vertex: VertexId, instance: &I) -> bool {
        match self.vertices[vertex.0].parent() {
            None => true,
            Some(region) => {
                instance.get_current(region) == Some(vertex)
                    && self.is_active(self.regions[region.0].parent, instance)
            }
        }
    }

    /// Whether every region of `state` has reached a final state.
    ///
    /// Simple states are trivially complete; pseudo-states never are.
    ///
    /// # Panics
    ///
    /// Panics if `state` was not created by this machine, or if `instance`
    /// holds ids of another machine.
    pub fn is_complete(&self, state: VertexId, instance: &I) -> bool {
        match &self.vertices[state.0] {
            Vertex::State(state) => state.regions.iter().all(|region| {
                instance
                    .get_current(*region)
                    .is_some_and(|current| self.vertices[current.0].is_final())
            }),
            Vertex::PseudoState(_) => false,
        }
    }
}
