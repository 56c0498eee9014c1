//! Basic State Machine
//!
//! This example builds a connection machine with a composite state, validates
//! it, and drives one instance through a few messages.
//!
//! Key concepts:
//! - States, regions and pseudo-states added to a `StateMachine`
//! - Guarded transitions built with the fluent transition builder
//! - Automatic compilation on first evaluation
//! - Trace output forwarded to a custom diagnostic sink
//!
//! Run with: cargo run --example basic_state_machine

use statetree::builder::transition;
use statetree::core::{MapInstance, PseudoStateKind, StateMachine};
use statetree::runtime::{evaluate, initialise, Context, Diagnostics};
use statetree::validation::validate;
use std::sync::Arc;

struct Console;

impl Diagnostics for Console {
    fn log(&self, message: &str) {
        println!("  [trace] {message}");
    }
}

fn main() {
    println!("=== Basic State Machine Example ===\n");

    let mut machine: StateMachine<&str, MapInstance<u32>> = StateMachine::new("connection");
    let root = machine.root();

    let initial = machine
        .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
        .unwrap();
    let disconnected = machine.add_state(root, "disconnected").unwrap();
    let online = machine.add_state(root, "online").unwrap();
    let online_initial = machine
        .add_pseudo_state(online, "initial", PseudoStateKind::Initial)
        .unwrap();
    let connecting = machine.add_state(online, "connecting").unwrap();
    let connected = machine.add_state(online, "connected").unwrap();

    machine.add_transition(transition(initial, disconnected)).unwrap();
    machine.add_transition(transition(online_initial, connecting)).unwrap();
    machine
        .add_transition(transition(disconnected, online).on("dial"))
        .unwrap();
    machine
        .add_transition(
            transition(connecting, connected)
                .on("ack")
                .effect(|_, attempts: &mut MapInstance<u32>| attempts.data += 1),
        )
        .unwrap();
    machine
        .add_transition(transition(online, disconnected).on("hangup"))
        .unwrap();

    let mut context = Context::new().with_diagnostics(Arc::new(Console));
    validate(&machine, &context).unwrap();
    println!("Model is well formed");

    let mut instance = MapInstance::new();
    initialise(&mut machine, &mut instance, &mut context).unwrap();

    for message in ["dial", "ack", "noise", "hangup"] {
        let consumed = evaluate(&mut machine, &mut instance, &message, &mut context).unwrap();
        println!("{message}: consumed = {consumed}");
    }

    println!("\nConnected {} time(s)", instance.data);
    println!(
        "Back to disconnected: {}",
        machine.is_active(disconnected, &instance)
    );
    println!("Still connected: {}", machine.is_active(connected, &instance));

    println!("\n=== Example Complete ===");
}
