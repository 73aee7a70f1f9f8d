//! Decoupled Grover Circuit Synthesis
//!
//! Builds the two search variants compared by the experiment harness:
//!
//! - **Standard**: superposition, oracle, diffusion.
//! - **Hardened**: the same skeleton with XX decoupling blocks spliced in at
//!   configurable [`InsertionPoint`]s.
//!
//! # Example
//!
//! ```rust
//! use ddgrover_synth::{Assembler, InsertionPoint, VariantDescriptor};
//!
//! let standard = Assembler::assemble(&VariantDescriptor::standard(0b11, 2)).unwrap();
//! let hardened = Assembler::assemble(&VariantDescriptor::hardened(
//!     0b11,
//!     2,
//!     InsertionPoint::ALL,
//! ))
//! .unwrap();
//!
//! assert_eq!(standard.gate_count, 12);
//! assert_eq!(hardened.gate_count, 20);
//! ```

pub mod assembler;
pub mod sequence;
pub mod variant;

pub use assembler::{AssembledCircuit, Assembler, build};
pub use sequence::{
    apply_decoupling, apply_diffusion, apply_oracle, apply_superposition, canonical_pair,
    oracle_flip_qubits,
};
pub use variant::{InsertionPoint, Variant, VariantDescriptor};
