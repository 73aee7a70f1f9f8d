//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur while building circuits.
///
/// Every variant is a configuration error: it is detected synchronously,
/// before anything reaches a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Circuit was created without qubits.
    #[error("Circuit must have at least one qubit")]
    NoQubits,

    /// Circuit is wider than the model supports.
    #[error("Circuit has {requested} qubits but at most {max} are supported")]
    TooManyQubits {
        /// Requested qubit count.
        requested: u32,
        /// Largest supported qubit count.
        max: u32,
    },

    /// Operand index outside `[0, num_qubits)`.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit circuit (gate: {gate})")]
    QubitOutOfRange {
        /// The offending operand.
        qubit: QubitId,
        /// Qubit count of the owning circuit.
        num_qubits: u32,
        /// Gate name for context.
        gate: &'static str,
    },

    /// Same qubit used twice in one operation.
    #[error("Duplicate qubit {qubit} in operation (gate: {gate})")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Gate name for context.
        gate: &'static str,
    },

    /// Target value does not fit in the register.
    #[error("Target value {target} does not fit in {num_qubits} qubits")]
    TargetOutOfRange {
        /// The requested target.
        target: u64,
        /// Register width.
        num_qubits: u32,
    },

    /// A sequence was parameterised for a different register width.
    #[error("Sequence built for {expected} qubits applied to a {got}-qubit circuit")]
    QubitCountMismatch {
        /// Width the sequence was asked to build for.
        expected: u32,
        /// Width of the circuit it was applied to.
        got: u32,
    },

    /// Sequence needs a wider register.
    #[error("Sequence '{sequence}' requires at least {required} qubits, got {got}")]
    TooFewQubits {
        /// Sequence name.
        sequence: &'static str,
        /// Minimum width.
        required: u32,
        /// Actual width.
        got: u32,
    },

    /// A search must run at least one oracle/diffusion round.
    #[error("Iteration count must be at least 1")]
    NoIterations,

    /// Bitstring could not be parsed.
    #[error("Invalid bitstring '{0}'")]
    InvalidBitstring(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
