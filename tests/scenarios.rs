//! End-to-end scenarios driving whole machines through the public API.

use statetree::builder::{internal, transition};
use statetree::compile::compile;
use statetree::core::{Instance, MapInstance, PseudoStateKind, StateMachine, VertexId};
use statetree::runtime::{evaluate, evaluate_compiled, initialise, initialise_compiled, Context};
use statetree::validation::is_well_formed;
use std::sync::Arc;

#[derive(Default)]
struct Journal {
    entries: Vec<String>,
    counter: u32,
}

type Machine = StateMachine<&'static str, MapInstance<Journal>>;

fn journal(machine: &mut Machine, state: VertexId, name: &'static str) {
    machine
        .on_entry(state, move |_, instance: &mut MapInstance<Journal>| {
            instance.data.entries.push(format!("enter {name}"))
        })
        .unwrap();
    machine
        .on_exit(state, move |_, instance: &mut MapInstance<Journal>| {
            instance.data.entries.push(format!("exit {name}"))
        })
        .unwrap();
}

#[test]
fn two_state_linear_machine() {
    let mut machine = Machine::new("linear");
    let root = machine.root();
    let initial = machine
        .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
        .unwrap();
    let first = machine.add_state(root, "first").unwrap();
    let second = machine.add_final_state(root, "second").unwrap();
    machine.add_transition(transition(initial, first)).unwrap();
    machine
        .add_transition(transition(first, second).on("advance").effect(
            |_, instance: &mut MapInstance<Journal>| instance.data.entries.push("advance".to_string()),
        ))
        .unwrap();
    journal(&mut machine, first, "first");
    assert!(is_well_formed(&machine));

    let mut context = Context::new();
    let mut instance = MapInstance::new();
    initialise(&mut machine, &mut instance, &mut context).unwrap();
    assert!(machine.is_active(first, &instance));

    assert!(!evaluate(&mut machine, &mut instance, &"unrelated", &mut context).unwrap());
    assert!(evaluate(&mut machine, &mut instance, &"advance", &mut context).unwrap());
    assert!(machine.is_active(second, &instance));
    assert!(!evaluate(&mut machine, &mut instance, &"advance", &mut context).unwrap());

    assert_eq!(
        instance.data.entries,
        vec!["enter first", "exit first", "advance"]
    );
}

#[test]
fn composite_with_shallow_history() {
    let mut machine = Machine::new("player");
    let root = machine.root();
    let initial = machine
        .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
        .unwrap();
    let operational = machine.add_state(root, "operational").unwrap();
    let flipped = machine.add_state(root, "flipped").unwrap();
    let history = machine
        .add_pseudo_state(operational, "history", PseudoStateKind::ShallowHistory)
        .unwrap();
    let stopped = machine.add_state(operational, "stopped").unwrap();
    let active = machine.add_state(operational, "active").unwrap();
    let active_initial = machine
        .add_pseudo_state(active, "initial", PseudoStateKind::Initial)
        .unwrap();
    let running = machine.add_state(active, "running").unwrap();
    let paused = machine.add_state(active, "paused").unwrap();

    machine.add_transition(transition(initial, operational)).unwrap();
    machine.add_transition(transition(history, stopped)).unwrap();
    machine.add_transition(transition(active_initial, running)).unwrap();
    machine.add_transition(transition(stopped, running).on("play")).unwrap();
    machine.add_transition(transition(running, paused).on("pause")).unwrap();
    machine.add_transition(transition(paused, running).on("play")).unwrap();
    machine.add_transition(transition(active, stopped).on("stop")).unwrap();
    machine.add_transition(transition(operational, flipped).on("flip")).unwrap();
    machine.add_transition(transition(flipped, operational).on("flip")).unwrap();
    journal(&mut machine, operational, "operational");
    journal(&mut machine, active, "active");
    journal(&mut machine, running, "running");
    journal(&mut machine, paused, "paused");

    let mut context = Context::new();
    let mut instance = MapInstance::new();
    initialise(&mut machine, &mut instance, &mut context).unwrap();
    assert!(machine.is_active(stopped, &instance));

    for message in ["play", "pause"] {
        assert!(evaluate(&mut machine, &mut instance, &message, &mut context).unwrap());
    }
    assert!(machine.is_active(paused, &instance));

    instance.data.entries.clear();
    evaluate(&mut machine, &mut instance, &"flip", &mut context).unwrap();
    assert!(machine.is_active(flipped, &instance));
    assert_eq!(
        instance.data.entries,
        vec!["exit paused", "exit active", "exit operational"]
    );

    // Shallow history restores `active`, but `active` itself is entered
    // through its initial pseudo-state.
    instance.data.entries.clear();
    evaluate(&mut machine, &mut instance, &"flip", &mut context).unwrap();
    assert!(machine.is_active(active, &instance));
    assert!(machine.is_active(running, &instance));
    assert_eq!(
        instance.data.entries,
        vec!["enter operational", "enter active", "enter running"]
    );
}

#[test]
fn three_way_random_choice() {
    let mut machine = Machine::new("dice");
    let root = machine.root();
    let initial = machine
        .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
        .unwrap();
    let waiting = machine.add_state(root, "waiting").unwrap();
    let choice = machine
        .add_pseudo_state(root, "choice", PseudoStateKind::Choice)
        .unwrap();
    let faces: Vec<VertexId> = ["low", "middle", "high"]
        .into_iter()
        .map(|name| machine.add_state(root, name).unwrap())
        .collect();
    machine.add_transition(transition(initial, waiting)).unwrap();
    machine.add_transition(transition(waiting, choice).on("roll")).unwrap();
    for face in &faces {
        machine.add_transition(transition(choice, *face)).unwrap();
        machine.add_transition(transition(*face, waiting).on("again")).unwrap();
    }
    assert!(is_well_formed(&machine));

    let mut context = Context::new();
    let mut instance = MapInstance::new();
    initialise(&mut machine, &mut instance, &mut context).unwrap();

    let mut seen = [0usize; 3];
    for _ in 0..300 {
        assert!(evaluate(&mut machine, &mut instance, &"roll", &mut context).unwrap());
        let face = faces
            .iter()
            .position(|face| machine.is_active(*face, &instance))
            .unwrap();
        seen[face] += 1;
        evaluate(&mut machine, &mut instance, &"again", &mut context).unwrap();
    }

    assert!(seen.iter().all(|count| *count > 0), "{seen:?}");
    assert_eq!(seen.iter().sum::<usize>(), 300);
}

#[test]
fn guarded_transition_to_terminate() {
    let mut machine = Machine::new("fuse");
    let root = machine.root();
    let initial = machine
        .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
        .unwrap();
    let burning = machine.add_state(root, "burning").unwrap();
    let boom = machine
        .add_pseudo_state(root, "boom", PseudoStateKind::Terminate)
        .unwrap();
    machine.add_transition(transition(initial, burning)).unwrap();
    machine
        .add_transition(
            internal(burning)
                .when(|trigger, instance: &MapInstance<Journal>| {
                    trigger.message() == Some(&"tick") && instance.data.counter < 3
                })
                .effect(|_, instance: &mut MapInstance<Journal>| instance.data.counter += 1),
        )
        .unwrap();
    machine
        .add_transition(transition(burning, boom).when(
            |trigger, instance: &MapInstance<Journal>| {
                trigger.message() == Some(&"tick") && instance.data.counter >= 3
            },
        ))
        .unwrap();
    journal(&mut machine, burning, "burning");

    let mut context = Context::new();
    let mut instance = MapInstance::new();
    initialise(&mut machine, &mut instance, &mut context).unwrap();

    for _ in 0..3 {
        assert!(evaluate(&mut machine, &mut instance, &"tick", &mut context).unwrap());
        assert!(!instance.is_terminated());
    }
    assert!(evaluate(&mut machine, &mut instance, &"tick", &mut context).unwrap());
    assert!(instance.is_terminated());
    assert_eq!(
        instance.data.entries,
        vec!["enter burning", "exit burning"]
    );

    // Absorbing: nothing is consumed and no action runs.
    assert!(!evaluate(&mut machine, &mut instance, &"tick", &mut context).unwrap());
    assert_eq!(instance.data.counter, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_instances_share_one_compiled_machine() {
    let mut machine: StateMachine<&'static str, MapInstance<u32>> = StateMachine::new("shared");
    let root = machine.root();
    let initial = machine
        .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
        .unwrap();
    let even = machine.add_state(root, "even").unwrap();
    let odd = machine.add_state(root, "odd").unwrap();
    machine.add_transition(transition(initial, even)).unwrap();
    for (from, to) in [(even, odd), (odd, even)] {
        machine
            .add_transition(
                transition(from, to)
                    .on("flip")
                    .effect(|_, instance: &mut MapInstance<u32>| instance.data += 1),
            )
            .unwrap();
    }
    compile(&mut machine);
    let machine = Arc::new(machine);

    let handles: Vec<_> = (0..8u32)
        .map(|flips| {
            let machine = Arc::clone(&machine);
            tokio::spawn(async move {
                let mut context = Context::new();
                let mut instance = MapInstance::new();
                initialise_compiled(&machine, &mut instance, &mut context).unwrap();
                for _ in 0..flips {
                    evaluate_compiled(&machine, &mut instance, &"flip", &mut context).unwrap();
                }
                (flips, instance)
            })
        })
        .collect();

    for handle in handles {
        let (flips, instance) = handle.await.unwrap();
        assert_eq!(instance.data, flips);
        let expected = if flips % 2 == 0 { even } else { odd };
        assert!(machine.is_active(expected, &instance));
    }
}
