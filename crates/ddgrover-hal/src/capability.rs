//! Backend capability introspection.
//!
//! [`Capabilities`] tells the core what a backend accepts before anything is
//! submitted: register width, gate set, shot and size limits, and whether
//! the backend can serve several jobs at once.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate names (`h`, `x`, `cz`).
    pub gate_set: Vec<String>,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Maximum gate operations per circuit; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_circuit_ops: Option<u32>,
    /// Simulator (`true`) vs physical device (`false`).
    pub is_simulator: bool,
    /// Whether jobs may be in flight concurrently.
    ///
    /// Physical devices usually serialize submissions, so this defaults to
    /// `false` outside simulators.
    #[serde(default)]
    pub supports_concurrent_jobs: bool,
}

impl Capabilities {
    /// Capabilities of a local simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: default_gate_set(),
            max_shots: 100_000,
            max_circuit_ops: None,
            is_simulator: true,
            supports_concurrent_jobs: true,
        }
    }

    /// Capabilities of a physical device.
    pub fn device(name: impl Into<String>, num_qubits: u32, max_shots: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: default_gate_set(),
            max_shots,
            max_circuit_ops: None,
            is_simulator: false,
            supports_concurrent_jobs: false,
        }
    }

    /// Limit the number of operations per circuit.
    pub fn with_max_circuit_ops(mut self, max_ops: u32) -> Self {
        self.max_circuit_ops = Some(max_ops);
        self
    }

    /// Declare support for concurrent jobs.
    pub fn with_concurrent_jobs(mut self, concurrent: bool) -> Self {
        self.supports_concurrent_jobs = concurrent;
        self
    }

    /// Whether `gate` is in the supported set.
    pub fn supports_gate(&self, gate: &str) -> bool {
        self.gate_set.iter().any(|g| g == gate)
    }
}

fn default_gate_set() -> Vec<String> {
    ["h", "x", "cz"].map(String::from).to_vec()
}
