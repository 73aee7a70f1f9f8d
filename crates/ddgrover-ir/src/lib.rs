//! ddgrover Circuit Model
//!
//! The leaf crate of the workspace: a minimal, append-only representation of
//! a sequence of gate operations over an indexed set of qubits.
//!
//! Gate order is execution order. Decoupling pulses are identity-equivalent
//! but carry physical timing, so the model offers no removal, reordering or
//! simplification of any kind.
//!
//! # Example
//!
//! ```rust
//! use ddgrover_ir::{Circuit, Gate, QubitId};
//!
//! let mut circuit = Circuit::new(2).unwrap();
//! circuit.h(QubitId(0)).unwrap().h(QubitId(1)).unwrap();
//! circuit.cz(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_ops(), 3);
//! assert_eq!(circuit.operations()[2], Gate::ControlledZ {
//!     control: QubitId(0),
//!     target: QubitId(1),
//! });
//! ```
//!
//! # Gate Set
//!
//! | Gate | Qubits | Name |
//! |------|--------|------|
//! | `Hadamard` | 1 | `h` |
//! | `PauliX` | 1 | `x` |
//! | `ControlledZ` | 2 | `cz` |

pub mod bits;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod qubit;

pub use bits::{format_bitstring, parse_bitstring, target_bits};
pub use circuit::{Circuit, MAX_QUBITS};
pub use error::{IrError, IrResult};
pub use gate::Gate;
pub use qubit::QubitId;
