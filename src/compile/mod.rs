//! Bootstrap compiler.
//!
//! Turns a model tree into flat action sequences in two passes:
//!
//! 1. A depth-first pass over regions and vertices produces, for every
//!    element, the sequences run when it is left and entered.
//! 2. A pass over transitions splices those sequences into one `traverse`
//!    sequence per transition, by comparing the ancestor chains of its source
//!    and target.
//!
//! The compiler assumes a well-formed model; run
//! [`validate`](crate::validation::validate) first to catch mistakes.

mod behavior;

pub(crate) use behavior::{Compiled, ElementBehavior, LocalEntry, Step};

use crate::core::{
    ElementId, PseudoStateKind, RegionId, StateMachine, TransitionId, TransitionKind, Vertex,
    VertexId,
};
use std::sync::Arc;
use tracing::debug;

/// Compile `machine`, replacing any previously compiled sequences.
///
/// Idempotent; the evaluator calls it automatically whenever the machine is
/// dirty unless told otherwise.
///
/// # Example
///
/// ```rust
/// use statetree::compile::compile;
/// use statetree::core::{MapInstance, StateMachine};
///
/// let mut machine: StateMachine<&str, MapInstance> = StateMachine::new("m");
/// let root = machine.root();
/// machine.add_state(root, "idle").unwrap();
///
/// compile(&mut machine);
/// assert!(machine.is_clean());
/// ```
pub fn compile<M, I>(machine: &mut StateMachine<M, I>) {
    let compiled = Compiler::new(machine).run();

    debug!(
        machine = machine.name(),
        regions = compiled.regions.len(),
        vertices = compiled.vertices.len(),
        transitions = compiled.traverse.len(),
        "compiled state machine"
    );

    machine.compiled = compiled;
    machine.mark_clean();
}

struct Compiler<'a, M, I> {
    machine: &'a StateMachine<M, I>,
    regions: Vec<ElementBehavior<M, I>>,
    vertices: Vec<ElementBehavior<M, I>>,
}

impl<'a, M, I> Compiler<'a, M, I> {
    fn new(machine: &'a StateMachine<M, I>) -> Self {
        Self {
            machine,
            regions: machine.regions().map(|_| ElementBehavior::default()).collect(),
            vertices: machine.vertices().map(|_| ElementBehavior::default()).collect(),
        }
    }

    fn run(mut self) -> Compiled<M, I> {
        let root = self.machine.root();
        self.vertex(root, false);

        let traverse = self
            .machine
            .transitions()
            .map(|(id, _)| self.transition(id))
            .collect();
        let on_initialise = self.vertices[root.index()].enter();

        Compiled {
            regions: self.regions,
            vertices: self.vertices,
            traverse,
            on_initialise,
        }
    }

    fn trace(&self, element: impl Into<ElementId>, action: &str) -> Step<M, I> {
        let name = self.machine.qualified_name(element);
        Step::Trace(Arc::from(format!("{name} {action}")))
    }

    fn region(&mut self, id: RegionId, deep_history_above: bool) {
        let machine = self.machine;
        let region = machine.region_at(id);
        let initial = region
            .vertices()
            .iter()
            .copied()
            .find(|vertex| machine.vertex_at(*vertex).is_initial());
        let initial_kind = initial.and_then(|vertex| machine.vertex_at(vertex).pseudo_kind());
        let deep_history_here =
            deep_history_above || initial_kind == Some(PseudoStateKind::DeepHistory);

        for vertex in region.vertices() {
            self.vertex(*vertex, deep_history_here);
        }

        let end_enter = match initial {
            Some(initial)
                if !deep_history_above && initial_kind == Some(PseudoStateKind::Initial) =>
            {
                self.vertices[initial.index()].enter()
            }
            _ => vec![Step::EnterRegion {
                region: id,
                initial,
                initial_kind,
            }],
        };

        let leave_trace = self.trace(id, "leave");
        let enter_trace = self.trace(id, "enter");
        let behavior = &mut self.regions[id.index()];
        behavior.leave = vec![Step::LeaveRegion(id), leave_trace];
        behavior.begin_enter = vec![enter_trace];
        behavior.end_enter = end_enter;
    }

    fn vertex(&mut self, id: VertexId, deep_history_above: bool) {
        let leave_trace = self.trace(id, "leave");
        let enter_trace = self.trace(id, "enter");
        let machine = self.machine;

        match machine.vertex_at(id) {
            Vertex::PseudoState(pseudo) => {
                let behavior = &mut self.vertices[id.index()];
                behavior.leave.push(leave_trace);
                behavior.begin_enter.push(enter_trace);

                if pseudo.is_initial() {
                    if let Some(transition) = pseudo.outgoing.first() {
                        behavior.end_enter.push(Step::TraverseInitial(*transition));
                    }
                } else if pseudo.kind() == PseudoStateKind::Terminate {
                    behavior.begin_enter.push(Step::Terminate);
                }
            }
            Vertex::State(state) => {
                for region in state.regions() {
                    self.region(*region, deep_history_above);
                }

                let mut leave = Vec::new();
                let mut end_enter = Vec::new();
                for region in state.regions() {
                    let compiled = &self.regions[region.index()];
                    leave.extend(compiled.leave.iter().cloned());
                    end_enter.extend(compiled.enter());
                }
                leave.push(leave_trace);
                leave.extend(state.exit_behavior().iter().cloned().map(Step::Run));

                let mut begin_enter = vec![enter_trace];
                begin_enter.extend(state.entry_behavior().iter().cloned().map(Step::Run));
                if let Some(region) = state.parent {
                    begin_enter.push(Step::SetCurrent { region, state: id });
                }

                let behavior = &mut self.vertices[id.index()];
                behavior.leave = leave;
                behavior.begin_enter = begin_enter;
                behavior.end_enter = end_enter;
            }
        }
    }

    fn transition(&self, id: TransitionId) -> Vec<Step<M, I>> {
        let transition = self.machine.transition_at(id);
        let effect = transition.effect_behavior().iter().cloned().map(Step::Run);

        let Some(target) = transition.target() else {
            return effect.collect();
        };
        let source = transition.source();

        if transition.kind() == TransitionKind::Local
            && source != target
            && self.machine.is_ancestor(source, target)
        {
            return vec![Step::Local(self.local_entries(id, source, target))];
        }

        let source_chain = self.chain(source);
        let target_chain = self.chain(target);
        let index = self.divergence(&source_chain, &target_chain);

        let mut steps = self.vertices[source_chain[index].index()].leave.clone();
        steps.extend(effect);
        self.cascade(&target_chain, index, &mut steps);
        steps.extend(self.vertices[target.index()].end_enter.iter().cloned());
        steps
    }

    /// One candidate per vertex on the path below the source: leave what is
    /// active in that vertex's region, run the effect, enter down to the target.
    fn local_entries(
        &self,
        id: TransitionId,
        source: VertexId,
        target: VertexId,
    ) -> Vec<LocalEntry<M, I>> {
        let transition = self.machine.transition_at(id);
        let chain = self.chain(target);
        let start = chain
            .iter()
            .position(|vertex| *vertex == source)
            .map_or(chain.len(), |position| position + 1);

        (start..chain.len())
            .filter_map(|index| {
                let vertex = chain[index];
                let region = self.machine.vertex_at(vertex).parent()?;

                let mut steps = self.regions[region.index()].leave.clone();
                steps.extend(transition.effect_behavior().iter().cloned().map(Step::Run));
                self.cascade(&chain, index, &mut steps);
                steps.extend(self.vertices[target.index()].end_enter.iter().cloned());

                Some(LocalEntry {
                    region,
                    vertex,
                    steps,
                })
            })
            .collect()
    }

    /// Root-to-vertex chain of vertices only.
    fn chain(&self, vertex: VertexId) -> Vec<VertexId> {
        self.machine
            .ancestors(vertex)
            .into_iter()
            .filter_map(|element| match element {
                ElementId::Vertex(vertex) => Some(vertex),
                ElementId::Region(_) => None,
            })
            .collect()
    }

    /// Index of the first vertex to leave and enter: where the chains diverge,
    /// clamped so that self-transitions and transitions to ancestors or
    /// descendants exit and re-enter the shorter chain's last vertex.
    fn divergence(&self, source_chain: &[VertexId], target_chain: &[VertexId]) -> usize {
        let shortest = source_chain.len().min(target_chain.len());
        let mut index = source_chain
            .iter()
            .zip(target_chain)
            .take_while(|(source, target)| source == target)
            .count();

        if index == shortest {
            return shortest - 1;
        }

        // Siblings in different orthogonal regions: leave and re-enter the
        // state owning both regions. Leaving only the source's region would
        // replace the target region's active state without running its exit.
        let source_region = self.machine.vertex_at(source_chain[index]).parent();
        let target_region = self.machine.vertex_at(target_chain[index]).parent();
        if source_region != target_region && index > 0 {
            index -= 1;
        }
        index
    }

    /// Begin-enter every vertex of `chain` from `from`, entering each
    /// orthogonal region that is not on the path through its initial vertex.
    fn cascade(&self, chain: &[VertexId], from: usize, steps: &mut Vec<Step<M, I>>) {
        for index in from..chain.len() {
            let vertex = chain[index];
            steps.extend(self.vertices[vertex.index()].begin_enter.iter().cloned());

            let Some(next) = chain.get(index + 1) else {
                continue;
            };
            let Vertex::State(state) = self.machine.vertex_at(vertex) else {
                continue;
            };
            let path_region = self.machine.vertex_at(*next).parent();

            for region in state.regions() {
                let behavior = &self.regions[region.index()];
                steps.extend(behavior.begin_enter.iter().cloned());
                if Some(*region) != path_region {
                    steps.extend(behavior.end_enter.iter().cloned());
                }
            }
        }
    }
}
