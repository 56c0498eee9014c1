//! Runtime evaluator.
//!
//! Walks the sequences produced by [`compile`](crate::compile::compile)
//! against an [`Instance`]. Messages are dispatched depth-first over the active
//! configuration: the innermost active states get the first chance to consume
//! a message, and a state fires at most one of its own transitions per
//! message.
//!
//! The `*_compiled` variants take the machine by shared reference, so one
//! compiled machine can serve many instances at once, each with its own
//! [`Context`].
//!
//! An instance belongs to the machine that initialised it; evaluating it
//! against another machine may panic on an out-of-range id.

mod context;
mod error;

pub use context::{Context, DefaultDiagnostics, Diagnostics, RandomSource};
pub use error::MachineError;

use crate::compile::{compile, Step};
use crate::core::{
    Instance, PseudoStateKind, StateMachine, TransitionId, Trigger, Vertex, VertexId,
};
use tracing::debug;

/// Enter the machine's initial configuration, compiling it first if needed.
///
/// # Example
///
/// ```rust
/// use statetree::builder::transition;
/// use statetree::core::{Instance, MapInstance, PseudoStateKind, StateMachine};
/// use statetree::runtime::{evaluate, initialise, Context};
///
/// let mut machine: StateMachine<&str, MapInstance> = StateMachine::new("switch");
/// let root = machine.root();
/// let initial = machine.add_pseudo_state(root, "initial", PseudoStateKind::Initial).unwrap();
/// let off = machine.add_state(root, "off").unwrap();
/// let on = machine.add_state(root, "on").unwrap();
/// machine.add_transition(transition(initial, off)).unwrap();
/// machine.add_transition(transition(off, on).on("flip")).unwrap();
/// machine.add_transition(transition(on, off).on("flip")).unwrap();
///
/// let mut context = Context::new();
/// let mut instance = MapInstance::new();
/// initialise(&mut machine, &mut instance, &mut context).unwrap();
/// assert!(machine.is_active(off, &instance));
///
/// assert!(evaluate(&mut machine, &mut instance, &"flip", &mut context).unwrap());
/// assert!(machine.is_active(on, &instance));
/// assert!(!evaluate(&mut machine, &mut instance, &"unknown", &mut context).unwrap());
/// ```
pub fn initialise<M, I: Instance>(
    machine: &mut StateMachine<M, I>,
    instance: &mut I,
    context: &mut Context,
) -> Result<(), MachineError> {
    prepare(machine, context)?;
    initialise_compiled(machine, instance, context)
}

/// Evaluate `message`, returning whether any transition fired.
///
/// A terminated instance never consumes anything.
///
/// # Panics
///
/// Panics if `instance` holds the configuration of a different machine.
pub fn evaluate<M, I: Instance>(
    machine: &mut StateMachine<M, I>,
    instance: &mut I,
    message: &M,
    context: &mut Context,
) -> Result<bool, MachineError> {
    if instance.is_terminated() {
        return Ok(false);
    }
    prepare(machine, context)?;
    evaluate_compiled(machine, instance, message, context)
}

/// [`initialise`] for a machine that is already compiled.
pub fn initialise_compiled<M, I: Instance>(
    machine: &StateMachine<M, I>,
    instance: &mut I,
    context: &mut Context,
) -> Result<(), MachineError> {
    if !machine.is_clean() {
        return Err(MachineError::NotCompiled);
    }
    Evaluator::new(machine, context).run(
        &machine.compiled.on_initialise,
        &Trigger::Initialise,
        instance,
        false,
    )
}

/// [`evaluate`] for a machine that is already compiled.
pub fn evaluate_compiled<M, I: Instance>(
    machine: &StateMachine<M, I>,
    instance: &mut I,
    message: &M,
    context: &mut Context,
) -> Result<bool, MachineError> {
    if instance.is_terminated() {
        return Ok(false);
    }
    if !machine.is_clean() {
        return Err(MachineError::NotCompiled);
    }
    Evaluator::new(machine, context).evaluate_state(
        machine.root(),
        &Trigger::Message(message),
        instance,
    )
}

fn prepare<M, I>(machine: &mut StateMachine<M, I>, context: &Context) -> Result<(), MachineError> {
    if machine.is_clean() {
        return Ok(());
    }
    if !context.auto_compile() {
        return Err(MachineError::NotCompiled);
    }
    compile(machine);
    Ok(())
}

struct Evaluator<'a, M, I> {
    machine: &'a StateMachine<M, I>,
    context: &'a mut Context,
    /// Nesting of traversals in progress.
    depth: usize,
    /// States entered by the traversals in progress, innermost first.
    entered: Vec<VertexId>,
}

impl<'a, M, I: Instance> Evaluator<'a, M, I> {
    fn new(machine: &'a StateMachine<M, I>, context: &'a mut Context) -> Self {
        Self {
            machine,
            context,
            depth: 0,
            entered: Vec::new(),
        }
    }

    /// Interpret a compiled sequence. `deep_history` is set while restoring a
    /// configuration below a deep history pseudo-state.
    fn run(
        &mut self,
        steps: &'a [Step<M, I>],
        trigger: &Trigger<'_, M>,
        instance: &mut I,
        deep_history: bool,
    ) -> Result<(), MachineError> {
        let machine = self.machine;
        let compiled = &machine.compiled;

        for step in steps {
            match step {
                Step::Trace(message) => self.context.diagnostics().log(message),
                Step::Run(action) => action(trigger, instance),
                Step::SetCurrent { region, state } => instance.set_current(*region, *state),
                Step::Terminate => instance.set_terminated(true),
                Step::LeaveRegion(region) => {
                    if let Some(current) = instance.get_current(*region) {
                        self.run(&compiled.vertices[current.index()].leave, trigger, instance, false)?;
                    }
                }
                Step::EnterRegion {
                    region,
                    initial,
                    initial_kind,
                } => {
                    let history =
                        deep_history || initial_kind.is_some_and(PseudoStateKind::is_history);
                    let vertex = if history {
                        instance.get_current(*region).or(*initial)
                    } else {
                        *initial
                    };

                    if let Some(vertex) = vertex {
                        let deep =
                            deep_history || *initial_kind == Some(PseudoStateKind::DeepHistory);
                        let behavior = &compiled.vertices[vertex.index()];
                        self.run(&behavior.begin_enter, trigger, instance, deep)?;
                        self.run(&behavior.end_enter, trigger, instance, deep)?;
                    }
                }
                Step::TraverseInitial(transition) => self.traverse(*transition, trigger, instance)?,
                Step::Local(entries) => {
                    let entry = entries
                        .iter()
                        .find(|entry| instance.get_current(entry.region) != Some(entry.vertex))
                        .or(entries.last());
                    if let Some(entry) = entry {
                        self.run(&entry.steps, trigger, instance, false)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Run a transition and follow junction and choice branches. Completion
    /// of the states it entered is evaluated once the outermost traversal
    /// has finished, so no entry sequence is interrupted.
    fn traverse(
        &mut self,
        transition: TransitionId,
        trigger: &Trigger<'_, M>,
        instance: &mut I,
    ) -> Result<(), MachineError> {
        self.depth += 1;
        let result = self.follow(transition, trigger, instance);
        self.depth -= 1;
        result?;

        if self.depth == 0 {
            self.complete_entered(instance)?;
        }
        Ok(())
    }

    fn follow(
        &mut self,
        transition: TransitionId,
        trigger: &Trigger<'_, M>,
        instance: &mut I,
    ) -> Result<(), MachineError> {
        let machine = self.machine;
        let record = machine.transition_at(transition);

        debug!(
            from = %machine.qualified_name(record.source()),
            to = ?record.target().map(|target| machine.qualified_name(target)),
            "traversing transition"
        );

        self.run(&machine.compiled.traverse[transition.index()], trigger, instance, false)?;

        let Some(target) = record.target() else {
            return Ok(());
        };
        match machine.vertex_at(target) {
            Vertex::PseudoState(pseudo) if pseudo.kind().is_branch() => {
                if let Some(next) = self.select_branch(target, pseudo.kind(), trigger, instance)? {
                    self.follow(next, trigger, instance)?;
                }
            }
            Vertex::State(_) => self.entered.push(target),
            _ => {}
        }
        Ok(())
    }

    /// Evaluate completion of each entered state that is still active.
    fn complete_entered(&mut self, instance: &mut I) -> Result<(), MachineError> {
        let machine = self.machine;
        for state in std::mem::take(&mut self.entered) {
            if instance.is_terminated() {
                break;
            }
            if machine.is_active(state, instance) && machine.is_complete(state, instance) {
                self.evaluate_state(state, &Trigger::Completion(state), instance)?;
            }
        }
        Ok(())
    }

    /// Offer `trigger` to an active state; children first, then its own
    /// outgoing transitions.
    fn evaluate_state(
        &mut self,
        state: VertexId,
        trigger: &Trigger<'_, M>,
        instance: &mut I,
    ) -> Result<bool, MachineError> {
        let machine = self.machine;
        let Vertex::State(record) = machine.vertex_at(state) else {
            return Ok(false);
        };
        if instance.is_terminated() {
            return Ok(false);
        }

        let mut consumed = false;
        if !trigger.is_completion_of(state) {
            for region in record.regions() {
                let Some(current) = instance.get_current(*region) else {
                    continue;
                };
                if self.evaluate_state(current, trigger, instance)? {
                    consumed = true;
                    if !machine.is_active(state, instance) || instance.is_terminated() {
                        break;
                    }
                }
            }
        }

        if consumed {
            if machine.is_active(state, instance)
                && !instance.is_terminated()
                && machine.is_complete(state, instance)
            {
                self.evaluate_state(state, &Trigger::Completion(state), instance)?;
            }
            return Ok(true);
        }

        let enabled: Vec<TransitionId> = record
            .outgoing
            .iter()
            .copied()
            .filter(|transition| {
                machine
                    .transition_at(*transition)
                    .guard()
                    .check(state, trigger, instance)
            })
            .collect();

        match enabled.as_slice() {
            [] => Ok(false),
            [transition] => {
                self.traverse(*transition, trigger, instance)?;
                Ok(true)
            }
            _ => {
                self.context
                    .diagnostics()
                    .error(MachineError::AmbiguousTransition {
                        state: machine.qualified_name(state),
                        count: enabled.len(),
                    })?;
                Ok(false)
            }
        }
    }

    /// Pick the transition leaving a junction or choice, falling back to its
    /// else-branch.
    fn select_branch(
        &mut self,
        pseudo_state: VertexId,
        kind: PseudoStateKind,
        trigger: &Trigger<'_, M>,
        instance: &I,
    ) -> Result<Option<TransitionId>, MachineError> {
        let machine = self.machine;
        let outgoing = machine.vertex_at(pseudo_state).outgoing();
        let enabled: Vec<TransitionId> = outgoing
            .iter()
            .copied()
            .filter(|transition| {
                let record = machine.transition_at(*transition);
                !record.is_else() && record.guard().check(pseudo_state, trigger, instance)
            })
            .collect();

        let chosen = match (kind, enabled.len()) {
            (_, 0) => None,
            (PseudoStateKind::Junction, 1) => enabled.first().copied(),
            (PseudoStateKind::Junction, count) => {
                self.context
                    .diagnostics()
                    .error(MachineError::AmbiguousBranch {
                        pseudo_state: machine.qualified_name(pseudo_state),
                        count,
                    })?;
                return Ok(None);
            }
            (_, count) => enabled.get(self.context.random(count)).copied(),
        };

        let chosen = chosen.or_else(|| {
            outgoing
                .iter()
                .copied()
                .find(|transition| machine.transition_at(*transition).is_else())
        });
        if chosen.is_none() {
            self.context.diagnostics().error(MachineError::NoBranch {
                pseudo_state: machine.qualified_name(pseudo_state),
            })?;
        }
        Ok(chosen)
    }
}
