//! ddgrover Hardware Abstraction Layer
//!
//! The execution-adapter contract between the experiment core and whatever
//! runs circuits: a local simulator, a cloud service, or a physical QPU.
//!
//! # Overview
//!
//! - [`Backend`]: async job lifecycle plus the provided [`Backend::execute`]
//!   that turns a circuit and a shot count into a [`Counts`] table
//! - [`Capabilities`]: limits checked before submission
//! - [`HalError`]: `BackendUnavailable`, `Timeout` and `RejectedCircuit` are
//!   the failure modes the core distinguishes
//! - [`BackendRegistry`]: name-based construction for front ends
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use ddgrover_hal::{Backend, WaitPolicy};
//! use ddgrover_adapter_sim::SimulatorBackend;
//! use ddgrover_synth::{build, VariantDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let circuit = build(&VariantDescriptor::standard(0b10, 2))?;
//!     let backend = SimulatorBackend::new();
//!
//!     let counts = backend.execute(&circuit, 1000, &WaitPolicy::default()).await?;
//!     println!("found target {} times", counts.get(0b10));
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, WaitPolicy};
pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult};
