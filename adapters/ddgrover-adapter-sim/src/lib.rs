//! ddgrover Local Statevector Backend
//!
//! A small exact simulator for the `h` / `x` / `cz` gate set, used to run
//! experiments without hardware and as the reference adapter in tests.
//!
//! # Features
//!
//! - **Exact amplitudes**: noiseless runs evolve the state once and sample
//!   every shot from it
//! - **Bit-flip noise**: with [`SimulatorBackend::with_noise`] each gate is
//!   followed, with probability `p`, by an `X` on one of its qubits; each shot
//!   then follows its own trajectory
//! - **Reproducible**: [`SimulatorBackend::with_seed`] fixes the sampler
//!
//! Outcomes are reported MSB first, matching the register convention used by
//! targets: qubit 0 is the most significant bit.
//!
//! # Example
//!
//! ```ignore
//! use ddgrover_adapter_sim::SimulatorBackend;
//! use ddgrover_hal::{Backend, WaitPolicy};
//! use ddgrover_synth::{build, VariantDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new().with_seed(42);
//!     let circuit = build(&VariantDescriptor::standard(0b10, 2))?;
//!
//!     let counts = backend.execute(&circuit, 1000, &WaitPolicy::default()).await?;
//!     assert_eq!(counts.get(0b10), 1000);
//!     Ok(())
//! }
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
