//! Standard vs. decoupled Grover experiments.
//!
//! Runs a sequence of search stages twice, once with the plain circuit and
//! once with dynamical-decoupling blocks inserted, and reports per-stage
//! success rates, their product as a total system success rate, and the
//! hardened/standard improvement ratios.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ddgrover_adapter_sim::SimulatorBackend;
//! use ddgrover_exp::{ExperimentConfig, ExperimentEngine};
//! use ddgrover_synth::Variant;
//!
//! let engine = ExperimentEngine::new(
//!     Arc::new(SimulatorBackend::new()),
//!     ExperimentConfig::default(),
//! )?;
//! let report = engine.run().await?;
//! println!("{}", report.total_system_success_rate(Variant::Hardened));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod metric;
pub mod report;
pub mod stage;

pub use config::{
    ExperimentConfig, MAX_POLL_INTERVAL_MS, MAX_STAGE_TIMEOUT_SECS, ResolvedStage, StageSpec,
    TargetSpec,
};
pub use engine::{ExperimentEngine, StageObserver, run_experiment};
pub use error::{ExpError, ExpResult, FailureKind};
pub use metric::Metric;
pub use report::{
    ExperimentReport, ReportHeader, SCHEMA_VERSION, StageComparison, VariantReport,
    improvement_ratio, total_system_success_rate,
};
pub use stage::{StageFailure, StageOutcome, StageResult, StageRunner, run_stage};
