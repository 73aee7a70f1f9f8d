//! Gate operations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::qubit::QubitId;

/// One physical gate operation.
///
/// The set is closed: search logic and decoupling are both expressed with
/// these three gates only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum Gate {
    /// Hadamard gate.
    Hadamard {
        /// Operand.
        qubit: QubitId,
    },
    /// Pauli-X gate.
    PauliX {
        /// Operand.
        qubit: QubitId,
    },
    /// Controlled-Z gate.
    ControlledZ {
        /// Control qubit.
        control: QubitId,
        /// Target qubit.
        target: QubitId,
    },
}

impl Gate {
    /// Hadamard on `qubit`.
    pub fn h(qubit: QubitId) -> Self {
        Gate::Hadamard { qubit }
    }

    /// Pauli-X on `qubit`.
    pub fn x(qubit: QubitId) -> Self {
        Gate::PauliX { qubit }
    }

    /// Controlled-Z between `control` and `target`.
    pub fn cz(control: QubitId, target: QubitId) -> Self {
        Gate::ControlledZ { control, target }
    }

    /// OpenQASM-style name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Hadamard { .. } => "h",
            Gate::PauliX { .. } => "x",
            Gate::ControlledZ { .. } => "cz",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            Gate::Hadamard { .. } | Gate::PauliX { .. } => 1,
            Gate::ControlledZ { .. } => 2,
        }
    }

    /// Operands in declaration order.
    pub fn qubits(&self) -> Vec<QubitId> {
        match *self {
            Gate::Hadamard { qubit } | Gate::PauliX { qubit } => vec![qubit],
            Gate::ControlledZ { control, target } => vec![control, target],
        }
    }

    /// Largest operand index, used for range checks.
    pub fn max_qubit(&self) -> QubitId {
        match *self {
            Gate::Hadamard { qubit } | Gate::PauliX { qubit } => qubit,
            Gate::ControlledZ { control, target } => control.max(target),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Hadamard { qubit } | Gate::PauliX { qubit } => {
                write!(f, "{} {qubit}", self.name())
            }
            Gate::ControlledZ { control, target } => {
                write!(f, "{} {control}, {target}", self.name())
            }
        }
    }
}
