//! Append-only circuit builder.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::qubit::QubitId;

/// Widest register the model accepts; target values must fit in a `u64`.
pub const MAX_QUBITS: u32 = 63;

/// A quantum circuit over a fixed number of qubits.
///
/// Operations are stored in execution order and can only be appended.
/// Adapters receive circuits by shared reference, so a circuit handed to a
/// backend cannot change underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Circuit {
    /// Number of qubits.
    num_qubits: u32,
    /// Operations in execution order.
    operations: Vec<Gate>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> IrResult<Self> {
        if num_qubits == 0 {
            return Err(IrError::NoQubits);
        }
        if num_qubits > MAX_QUBITS {
            return Err(IrError::TooManyQubits {
                requested: num_qubits,
                max: MAX_QUBITS,
            });
        }
        Ok(Self {
            num_qubits,
            operations: vec![],
        })
    }

    /// Append one operation to the end of the circuit.
    pub fn append(&mut self, gate: Gate) -> IrResult<&mut Self> {
        self.check_operands(&gate)?;
        self.operations.push(gate);
        Ok(self)
    }

    fn check_operands(&self, gate: &Gate) -> IrResult<()> {
        for qubit in gate.qubits() {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits,
                    gate: gate.name(),
                });
            }
        }
        if let Gate::ControlledZ { control, target } = *gate {
            if control == target {
                return Err(IrError::DuplicateQubit {
                    qubit: control,
                    gate: gate.name(),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::h(qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::x(qubit))
    }

    /// Apply Controlled-Z gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::cz(control, target))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Operations in execution order.
    pub fn operations(&self) -> &[Gate] {
        &self.operations
    }

    /// Total number of operations.
    pub fn num_ops(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operation has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Histogram of operations keyed by gate name.
    pub fn count_ops(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for gate in &self.operations {
            *counts.entry(gate.name()).or_insert(0) += 1;
        }
        counts
    }

    /// All qubit ids in ascending order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + use<> {
        (0..self.num_qubits).map(QubitId)
    }

    /// Number of distinct values a measurement of every qubit can take.
    pub fn outcome_space(&self) -> u64 {
        1u64 << self.num_qubits
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "circuit ({} qubits, {} ops)",
            self.num_qubits,
            self.operations.len()
        )?;
        for (i, gate) in self.operations.iter().enumerate() {
            writeln!(f, "  {i:>3}: {gate}")?;
        }
        Ok(())
    }
}
