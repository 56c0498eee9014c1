//! Snapshot and resume of an instance's active configuration.
//!
//! A [`Snapshot`] mirrors the machine's state tree by element *names*, so it
//! stays meaningful across processes and across rebuilds of the same model.
//! Actions, guards and instance data are not captured.

use crate::core::{Instance, RegionId, State, StateMachine, Vertex, VertexId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of an instance's configuration.
///
/// # Example
///
/// ```rust
/// use statetree::builder::transition;
/// use statetree::checkpoint::Snapshot;
/// use statetree::core::{MapInstance, PseudoStateKind, StateMachine};
/// use statetree::runtime::{evaluate, initialise, Context};
///
/// let mut machine: StateMachine<&str, MapInstance> = StateMachine::new("job");
/// let root = machine.root();
/// let initial = machine.add_pseudo_state(root, "initial", PseudoStateKind::Initial).unwrap();
/// let queued = machine.add_state(root, "queued").unwrap();
/// let running = machine.add_state(root, "running").unwrap();
/// machine.add_transition(transition(initial, queued)).unwrap();
/// machine.add_transition(transition(queued, running).on("start")).unwrap();
///
/// let mut context = Context::new();
/// let mut instance = MapInstance::new();
/// initialise(&mut machine, &mut instance, &mut context).unwrap();
/// evaluate(&mut machine, &mut instance, &"start", &mut context).unwrap();
///
/// let json = Snapshot::capture(&machine, &instance).to_json().unwrap();
///
/// let mut resumed = MapInstance::new();
/// Snapshot::from_json(&json).unwrap().restore(&machine, &mut resumed).unwrap();
/// assert!(machine.is_active(running, &resumed));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Name of the machine's root state
    pub machine: String,

    pub terminated: bool,

    /// Recorded configuration, starting at the root
    pub root: StateNode,
}

/// A state and the recorded configuration of its regions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateNode {
    pub name: String,
    pub regions: Vec<RegionNode>,
}

/// A region's last-known vertex and its composite child states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionNode {
    pub name: String,
    pub current: Option<String>,
    pub states: Vec<StateNode>,
}

impl Snapshot {
    /// Record every region's last-known vertex, including those of inactive
    /// subtrees that history may restore later.
    pub fn capture<M, I: Instance>(machine: &StateMachine<M, I>, instance: &I) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            machine: machine.name().to_string(),
            terminated: instance.is_terminated(),
            root: capture_state(machine, machine.root(), instance),
        }
    }

    /// Write the recorded configuration into `instance`.
    ///
    /// Every name is resolved before anything is written; on error the
    /// instance is left untouched.
    pub fn restore<M, I: Instance>(
        &self,
        machine: &StateMachine<M, I>,
        instance: &mut I,
    ) -> Result<(), CheckpointError> {
        if self.machine != machine.name() {
            return Err(CheckpointError::MachineMismatch {
                expected: machine.name().to_string(),
                found: self.machine.clone(),
            });
        }

        let mut assignments = Vec::new();
        resolve_state(machine, machine.root(), &self.root, &mut assignments)?;

        for (region, vertex) in assignments {
            instance.set_current(region, vertex);
        }
        instance.set_terminated(self.terminated);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}

fn capture_state<M, I: Instance>(
    machine: &StateMachine<M, I>,
    id: VertexId,
    instance: &I,
) -> StateNode {
    let regions = machine
        .vertex(id)
        .and_then(Vertex::as_state)
        .map(|state| {
            state
                .regions()
                .iter()
                .map(|region| capture_region(machine, *region, instance))
                .collect()
        })
        .unwrap_or_default();

    StateNode {
        name: machine.element_name(id.into()).to_string(),
        regions,
    }
}

fn capture_region<M, I: Instance>(
    machine: &StateMachine<M, I>,
    id: RegionId,
    instance: &I,
) -> RegionNode {
    let states = machine
        .region(id)
        .map(|region| {
            region
                .vertices()
                .iter()
                .filter(|vertex| {
                    machine
                        .vertex(**vertex)
                        .and_then(Vertex::as_state)
                        .is_some_and(State::is_composite)
                })
                .map(|vertex| capture_state(machine, *vertex, instance))
                .collect()
        })
        .unwrap_or_default();

    RegionNode {
        name: machine.element_name(id.into()).to_string(),
        current: instance
            .get_current(id)
            .map(|vertex| machine.element_name(vertex.into()).to_string()),
        states,
    }
}

fn resolve_state<M, I>(
    machine: &StateMachine<M, I>,
    id: VertexId,
    node: &StateNode,
    assignments: &mut Vec<(RegionId, VertexId)>,
) -> Result<(), CheckpointError> {
    let unknown = |name: &str| {
        CheckpointError::UnknownElement(format!("{}.{}", machine.qualified_name(id), name))
    };
    let regions = machine
        .vertex(id)
        .and_then(Vertex::as_state)
        .map(State::regions)
        .unwrap_or_default();

    for region_node in &node.regions {
        let region = regions
            .iter()
            .copied()
            .find(|region| machine.element_name((*region).into()) == region_node.name)
            .ok_or_else(|| unknown(&region_node.name))?;
        resolve_region(machine, region, region_node, assignments)?;
    }
    Ok(())
}

fn resolve_region<M, I>(
    machine: &StateMachine<M, I>,
    id: RegionId,
    node: &RegionNode,
    assignments: &mut Vec<(RegionId, VertexId)>,
) -> Result<(), CheckpointError> {
    let vertices = machine.region(id).map(|region| region.vertices()).unwrap_or_default();
    let find = |name: &str| {
        vertices
            .iter()
            .copied()
            .find(|vertex| machine.element_name((*vertex).into()) == name)
            .ok_or_else(|| {
                CheckpointError::UnknownElement(format!("{}.{}", machine.qualified_name(id), name))
            })
    };

    if let Some(current) = &node.current {
        assignments.push((id, find(current)?));
    }
    for state_node in &node.states {
        let state = find(&state_node.name)?;
        resolve_state(machine, state, state_node, assignments)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::transition;
    use crate::core::{MapInstance, PseudoStateKind};
    use crate::runtime::{evaluate, initialise, Context};

    type Machine = StateMachine<&'static str, MapInstance>;

    struct Fixture {
        machine: Machine,
        outer: VertexId,
        second: VertexId,
        away: VertexId,
    }

    /// `outer` has a deep-history region holding `first` then `second`.
    fn fixture() -> Fixture {
        let mut machine = Machine::new("m");
        let root = machine.root();
        let initial = machine
            .add_pseudo_state(root, "initial", PseudoStateKind::Initial)
            .unwrap();
        let outer = machine.add_state(root, "outer").unwrap();
        let away = machine.add_state(root, "away").unwrap();
        let history = machine
            .add_pseudo_state(outer, "history", PseudoStateKind::DeepHistory)
            .unwrap();
        let first = machine.add_state(outer, "first").unwrap();
        let second = machine.add_state(outer, "second").unwrap();
        machine.add_transition(transition(initial, outer)).unwrap();
        machine.add_transition(transition(history, first)).unwrap();
        machine.add_transition(transition(first, second).on("next")).unwrap();
        machine.add_transition(transition(outer, away).on("leave")).unwrap();
        machine.add_transition(transition(away, outer).on("return")).unwrap();

        Fixture {
            machine,
            outer,
            second,
            away,
        }
    }

    fn run(machine: &mut Machine, messages: &[&'static str]) -> MapInstance {
        let mut context = Context::new();
        let mut instance = MapInstance::new();
        initialise(machine, &mut instance, &mut context).unwrap();
        for message in messages {
            evaluate(machine, &mut instance, message, &mut context).unwrap();
        }
        instance
    }

    #[test]
    fn capture_records_inactive_history() {
        let Fixture { mut machine, .. } = fixture();
        let instance = run(&mut machine, &["next", "leave"]);

        let snapshot = Snapshot::capture(&machine, &instance);

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.machine, "m");
        let root_region = &snapshot.root.regions[0];
        assert_eq!(root_region.current.as_deref(), Some("away"));
        assert_eq!(root_region.states[0].name, "outer");
        assert_eq!(root_region.states[0].regions[0].current.as_deref(), Some("second"));
    }

    #[test]
    fn restored_instance_resumes_with_history() {
        let Fixture {
            mut machine,
            outer,
            second,
            away,
        } = fixture();
        let instance = run(&mut machine, &["next", "leave"]);
        let json = Snapshot::capture(&machine, &instance).to_json().unwrap();

        let mut resumed = MapInstance::new();
        Snapshot::from_json(&json)
            .unwrap()
            .restore(&machine, &mut resumed)
            .unwrap();
        assert!(machine.is_active(away, &resumed));
        assert!(!machine.is_active(outer, &resumed));

        let mut context = Context::new();
        evaluate(&mut machine, &mut resumed, &"return", &mut context).unwrap();
        assert!(machine.is_active(second, &resumed));
    }

    #[test]
    fn binary_encoding_preserves_snapshot() {
        let Fixture { mut machine, .. } = fixture();
        let instance = run(&mut machine, &["next"]);
        let snapshot = Snapshot::capture(&machine, &instance);

        let decoded = Snapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();

        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let Fixture { mut machine, .. } = fixture();
        let instance = run(&mut machine, &[]);
        let mut snapshot = Snapshot::capture(&machine, &instance);
        snapshot.version = SNAPSHOT_VERSION + 1;

        let result = Snapshot::from_json(&snapshot.to_json().unwrap());

        assert!(matches!(
            result,
            Err(CheckpointError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn unknown_names_leave_instance_untouched() {
        let Fixture { mut machine, .. } = fixture();
        let instance = run(&mut machine, &["next"]);
        let mut snapshot = Snapshot::capture(&machine, &instance);
        snapshot.root.regions[0].states[0].regions[0].current = Some("missing".to_string());

        let mut target = MapInstance::new();
        let result = snapshot.restore(&machine, &mut target);

        assert!(matches!(result, Err(CheckpointError::UnknownElement(name)) if name.ends_with("missing")));
        assert_eq!(target.regions().count(), 0);
    }

    #[test]
    fn snapshot_of_other_machine_is_rejected() {
        let Fixture { mut machine, .. } = fixture();
        let instance = run(&mut machine, &[]);
        let snapshot = Snapshot::capture(&machine, &instance);
        let other = Machine::new("other");

        let result = snapshot.restore(&other, &mut MapInstance::new());

        assert!(matches!(result, Err(CheckpointError::MachineMismatch { .. })));
    }

    #[test]
    fn malformed_json_is_a_deserialization_error() {
        assert!(matches!(
            Snapshot::from_json("{not json"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
