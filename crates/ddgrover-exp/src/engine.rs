//! Multi-stage experiment engine.
//!
//! For every configured stage the engine runs one standard and one hardened
//! circuit with independent shot budgets, then folds the outcomes into an
//! [`ExperimentReport`]. A failing stage is recorded and the run moves on;
//! only run-wide configuration errors abort.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use ddgrover_hal::Backend;
use ddgrover_synth::{InsertionPoint, Variant, VariantDescriptor};

use crate::config::{ExperimentConfig, ResolvedStage};
use crate::error::ExpResult;
use crate::report::{ExperimentReport, ReportHeader};
use crate::stage::{StageOutcome, StageRunner};

/// Callback invoked after every stage run, in completion order.
pub type StageObserver = Box<dyn Fn(&StageOutcome) + Send + Sync>;

/// Runs an [`ExperimentConfig`] against one backend.
pub struct ExperimentEngine {
    backend: Arc<dyn Backend>,
    config: ExperimentConfig,
    stages: Vec<ResolvedStage>,
    observer: Option<StageObserver>,
}

impl ExperimentEngine {
    /// Validate `config` and prepare a run.
    pub fn new(backend: Arc<dyn Backend>, config: ExperimentConfig) -> ExpResult<Self> {
        let stages = config.validate()?;
        Ok(Self {
            backend,
            config,
            stages,
            observer: None,
        })
    }

    /// Report every stage outcome to `observer` as it arrives.
    pub fn with_observer(
        mut self,
        observer: impl Fn(&StageOutcome) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Number of stage runs (stages times variants).
    pub fn total_runs(&self) -> usize {
        self.stages.len() * Variant::ALL.len()
    }

    /// Execute every stage and assemble the report.
    pub async fn run(&self) -> ExpResult<ExperimentReport> {
        let concurrent = self.config.concurrent_stages
            && self.backend.capabilities().supports_concurrent_jobs;
        if self.config.concurrent_stages && !concurrent {
            warn!(
                backend = self.backend.name(),
                "backend does not accept concurrent jobs, running stages sequentially"
            );
        }

        info!(
            backend = self.backend.name(),
            stages = self.stages.len(),
            shots = self.config.shots,
            concurrent,
            "starting experiment"
        );

        let plan: Vec<(&ResolvedStage, VariantDescriptor)> = self
            .stages
            .iter()
            .flat_map(|stage| {
                Variant::ALL.into_iter().map(move |variant| {
                    (stage, self.descriptor(variant, stage.target))
                })
            })
            .collect();

        let runner = StageRunner::with_policy(self.backend.as_ref(), self.config.wait_policy());

        let outcomes: Vec<StageOutcome> = if concurrent {
            join_all(
                plan.iter()
                    .map(|(stage, descriptor)| self.run_one(&runner, stage, descriptor)),
            )
            .await
        } else {
            let mut outcomes = Vec::with_capacity(plan.len());
            for (stage, descriptor) in &plan {
                outcomes.push(self.run_one(&runner, stage, descriptor).await);
            }
            outcomes
        };

        let (standard, hardened): (Vec<_>, Vec<_>) = outcomes
            .into_iter()
            .partition(|o| o.variant() == Variant::Standard);

        let report = ExperimentReport::new(self.header(), standard, hardened);
        info!(
            standard_total = %report.total_system_success_rate(Variant::Standard),
            hardened_total = %report.total_system_success_rate(Variant::Hardened),
            failed = report.failed_stages().len(),
            "experiment complete"
        );
        Ok(report)
    }

    async fn run_one(
        &self,
        runner: &StageRunner<'_>,
        stage: &ResolvedStage,
        descriptor: &VariantDescriptor,
    ) -> StageOutcome {
        let result = runner
            .run(&stage.label, descriptor, self.config.shots)
            .await;
        let outcome = StageOutcome::from_result(&stage.label, descriptor, result);
        if let StageOutcome::Failed(f) = &outcome {
            warn!(
                stage = %stage.label,
                variant = %f.variant,
                kind = %f.kind,
                "stage failed: {}",
                f.message
            );
        }
        if let Some(observer) = &self.observer {
            observer(&outcome);
        }
        outcome
    }

    fn descriptor(&self, variant: Variant, target: u64) -> VariantDescriptor {
        VariantDescriptor::for_variant(
            variant,
            target,
            self.config.qubit_count,
            &self.config.insertion_points,
        )
        .with_iterations(self.config.iterations)
    }

    fn header(&self) -> ReportHeader {
        ReportHeader {
            backend: self.backend.name().to_string(),
            qubit_count: self.config.qubit_count,
            shots: self.config.shots,
            iterations: self.config.iterations,
            insertion_points: self.config.insertion_points.iter().copied().collect(),
        }
    }
}

/// Run the standard/hardened comparison over `stage_targets`.
///
/// Stages are labelled `Stage 1`, `Stage 2`, ... and run sequentially with the
/// default wait policy.
pub async fn run_experiment(
    stage_targets: &[u64],
    qubit_count: u32,
    shots: u32,
    insertion_points: impl IntoIterator<Item = InsertionPoint>,
    backend: Arc<dyn Backend>,
) -> ExpResult<ExperimentReport> {
    let config = ExperimentConfig::default()
        .with_targets(stage_targets)
        .with_qubit_count(qubit_count)
        .with_shots(shots)
        .with_insertion_points(insertion_points);
    ExperimentEngine::new(backend, config)?.run().await
}
