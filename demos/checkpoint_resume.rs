//! Checkpoint and Resume
//!
//! This example demonstrates saving an instance's configuration and resuming
//! it in a fresh instance, as a long-running workflow would after a restart.
//!
//! Key concepts:
//! - Snapshots record every region's last-known state by name
//! - Serialization formats (JSON for readability, binary for compactness)
//! - Deep history survives the round trip
//!
//! Run with: cargo run --example checkpoint_resume

use statetree::builder::transition;
use statetree::checkpoint::Snapshot;
use statetree::core::{MapInstance, PseudoStateKind, StateMachine};
use statetree::runtime::{evaluate, initialise, Context};

type Workflow = StateMachine<&'static str, MapInstance>;

fn build() -> Workflow {
    let mut machine = Workflow::new("workflow");
    let root = machine.root();
    let initial = machine
        .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
        .unwrap();
    let processing = machine.add_state(root, "processing").unwrap();
    let suspended = machine.add_state(root, "suspended").unwrap();
    let history = machine
        .add_pseudo_state(processing, "history", PseudoStateKind::DeepHistory)
        .unwrap();
    let mapping = machine.add_state(processing, "mapping").unwrap();
    let reducing = machine.add_state(processing, "reducing").unwrap();

    machine.add_transition(transition(initial, processing)).unwrap();
    machine.add_transition(transition(history, mapping)).unwrap();
    machine
        .add_transition(transition(mapping, reducing).on("mapped"))
        .unwrap();
    machine
        .add_transition(transition(processing, suspended).on("suspend"))
        .unwrap();
    machine
        .add_transition(transition(suspended, processing).on("resume"))
        .unwrap();
    machine
}

fn main() {
    println!("=== Checkpoint and Resume Example ===\n");

    let mut machine = build();
    let mut context = Context::new();
    let mut instance = MapInstance::new();
    initialise(&mut machine, &mut instance, &mut context).unwrap();
    for message in ["mapped", "suspend"] {
        evaluate(&mut machine, &mut instance, &message, &mut context).unwrap();
    }

    let snapshot = Snapshot::capture(&machine, &instance);
    let json = snapshot.to_json().unwrap();
    let bytes = snapshot.to_bytes().unwrap();
    println!("Snapshot {} taken at {}", snapshot.id, snapshot.timestamp);
    println!("JSON: {} bytes, binary: {} bytes", json.len(), bytes.len());
    println!("{json}\n");

    // A new process rebuilds the same model and resumes from the snapshot.
    let mut machine = build();
    let mut resumed = MapInstance::new();
    Snapshot::from_bytes(&bytes)
        .unwrap()
        .restore(&machine, &mut resumed)
        .unwrap();

    evaluate(&mut machine, &mut resumed, &"resume", &mut context).unwrap();
    let reducing = machine
        .find_vertex("workflow.default.processing.default.reducing")
        .unwrap();
    println!(
        "Resumed into reducing: {}",
        machine.is_active(reducing, &resumed)
    );

    println!("\n=== Example Complete ===");
}
