//! Stage runner: one descriptor, one adapter call, one success rate.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use ddgrover_hal::{Backend, HalError, WaitPolicy};
use ddgrover_ir::format_bitstring;
use ddgrover_synth::{Assembler, Variant, VariantDescriptor};

use crate::error::{ExpError, ExpResult, FailureKind};

/// Measured outcome of one completed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name.
    pub label: String,
    /// Variant that was executed.
    pub variant: Variant,
    /// Value searched for.
    pub target: u64,
    /// Shots requested and returned.
    pub shots: u32,
    /// Shots that measured the target.
    pub success_count: u64,
    /// `success_count / shots`.
    pub success_rate: f64,
    /// Operations in the submitted circuit.
    pub gate_count: usize,
    /// Wall time spent on the adapter call.
    pub elapsed_ms: u64,
}

/// A stage that produced no measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    /// Stage name.
    pub label: String,
    /// Variant that was attempted.
    pub variant: Variant,
    /// Value searched for.
    pub target: u64,
    /// Failure class.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
}

/// Outcome of one stage for one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    /// The adapter returned a valid table.
    Completed(StageResult),
    /// Construction or execution failed; no rate exists.
    Failed(StageFailure),
}

impl StageOutcome {
    /// Wrap a runner result, turning errors into tagged failures.
    pub fn from_result(
        label: &str,
        descriptor: &VariantDescriptor,
        result: ExpResult<StageResult>,
    ) -> Self {
        match result {
            Ok(r) => StageOutcome::Completed(r),
            Err(e) => StageOutcome::Failed(StageFailure {
                label: label.to_string(),
                variant: descriptor.variant(),
                target: descriptor.target,
                kind: e.kind(),
                message: e.to_string(),
            }),
        }
    }

    /// Stage name.
    pub fn label(&self) -> &str {
        match self {
            StageOutcome::Completed(r) => &r.label,
            StageOutcome::Failed(f) => &f.label,
        }
    }

    /// Variant the stage belongs to.
    pub fn variant(&self) -> Variant {
        match self {
            StageOutcome::Completed(r) => r.variant,
            StageOutcome::Failed(f) => f.variant,
        }
    }

    /// Value searched for.
    pub fn target(&self) -> u64 {
        match self {
            StageOutcome::Completed(r) => r.target,
            StageOutcome::Failed(f) => f.target,
        }
    }

    /// Success rate, if the stage completed.
    pub fn success_rate(&self) -> Option<f64> {
        match self {
            StageOutcome::Completed(r) => Some(r.success_rate),
            StageOutcome::Failed(_) => None,
        }
    }

    /// Circuit size, if the stage completed.
    pub fn gate_count(&self) -> Option<usize> {
        match self {
            StageOutcome::Completed(r) => Some(r.gate_count),
            StageOutcome::Failed(_) => None,
        }
    }

    /// The completed result, if any.
    pub fn result(&self) -> Option<&StageResult> {
        match self {
            StageOutcome::Completed(r) => Some(r),
            StageOutcome::Failed(_) => None,
        }
    }

    /// Whether the stage failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }
}

/// Runs single stages against one backend.
pub struct StageRunner<'a> {
    backend: &'a dyn Backend,
    policy: WaitPolicy,
    timeout: Duration,
}

impl<'a> StageRunner<'a> {
    /// Runner with the default wait policy.
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self::with_policy(backend, WaitPolicy::default())
    }

    /// Runner polling with `policy`.
    ///
    /// The whole adapter call is bounded by the policy timeout plus one poll
    /// interval, so the adapter gets a chance to cancel its own job first.
    pub fn with_policy(backend: &'a dyn Backend, policy: WaitPolicy) -> Self {
        Self {
            backend,
            timeout: policy.timeout.saturating_add(policy.poll_interval),
            policy,
        }
    }

    /// Build the circuit for `descriptor`, execute it and score the target.
    #[instrument(
        name = "stage",
        skip(self, descriptor),
        fields(variant = %descriptor.variant(), target_value = descriptor.target)
    )]
    pub async fn run(
        &self,
        label: &str,
        descriptor: &VariantDescriptor,
        shots: u32,
    ) -> ExpResult<StageResult> {
        if shots == 0 {
            return Err(ExpError::InvalidConfiguration(
                "shots must be positive".into(),
            ));
        }

        let assembled = Assembler::assemble(descriptor)?;
        let started = Instant::now();

        let counts = match tokio::time::timeout(
            self.timeout,
            self.backend
                .execute(&assembled.circuit, shots, &self.policy),
        )
        .await
        {
            Ok(counts) => counts?,
            Err(_) => {
                warn!(backend = self.backend.name(), "stage exceeded {:?}", self.timeout);
                return Err(HalError::Timeout(format!(
                    "stage {label} exceeded {}s",
                    self.timeout.as_secs()
                ))
                .into());
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        counts.validate(shots, descriptor.qubit_count)?;

        let success_count = counts.get(descriptor.target);
        let success_rate = success_count as f64 / f64::from(shots);
        debug!(success_count, success_rate, elapsed_ms, "stage complete");

        Ok(StageResult {
            label: label.to_string(),
            variant: assembled.variant,
            target: descriptor.target,
            shots,
            success_count,
            success_rate,
            gate_count: assembled.gate_count,
            elapsed_ms,
        })
    }
}

/// Run one stage with the default wait policy, labelled by its bitstring.
pub async fn run_stage(
    descriptor: &VariantDescriptor,
    shots: u32,
    backend: &dyn Backend,
) -> ExpResult<StageResult> {
    let label = format_bitstring(descriptor.target, descriptor.qubit_count);
    StageRunner::new(backend)
        .run(&label, descriptor, shots)
        .await
}
