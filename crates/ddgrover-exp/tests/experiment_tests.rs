//! End-to-end experiment runs against scripted and simulated backends.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ddgrover_adapter_sim::SimulatorBackend;
use ddgrover_exp::{
    ExpError, ExperimentConfig, ExperimentEngine, FailureKind, Metric, StageOutcome,
    run_experiment,
};
use ddgrover_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus,
};
use ddgrover_ir::Circuit;
use ddgrover_synth::{InsertionPoint, Variant};

/// What the scripted backend does with the next submission.
enum Script {
    Table(Counts),
    Reject(HalError),
    /// Job is accepted but never completes.
    Hang,
    /// `submit` itself never returns.
    Stall,
}

/// Backend that answers submissions from a queue, in submission order.
struct ScriptedBackend {
    capabilities: Capabilities,
    script: Mutex<VecDeque<Script>>,
    jobs: Mutex<Vec<Option<Counts>>>,
    cancelled: AtomicUsize,
}

impl ScriptedBackend {
    fn new(script: impl IntoIterator<Item = Script>) -> Self {
        Self {
            capabilities: Capabilities::device("scripted", 2, 10_000),
            script: Mutex::new(script.into_iter().collect()),
            jobs: Mutex::new(Vec::new()),
            cancelled: AtomicUsize::new(0),
        }
    }

    fn job_index(job_id: &JobId) -> usize {
        job_id.0.parse().unwrap()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted");
        if let Script::Stall = next {
            std::future::pending::<()>().await;
        }
        let mut jobs = self.jobs.lock().unwrap();
        match next {
            Script::Table(counts) => jobs.push(Some(counts)),
            Script::Hang | Script::Stall => jobs.push(None),
            Script::Reject(e) => return Err(e),
        }
        Ok(JobId::new((jobs.len() - 1).to_string()))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        match self.jobs.lock().unwrap()[Self::job_index(job_id)] {
            Some(_) => Ok(JobStatus::Completed),
            None => Ok(JobStatus::Running),
        }
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let counts = self.jobs.lock().unwrap()[Self::job_index(job_id)]
            .clone()
            .unwrap();
        let shots = counts.total_shots() as u32;
        Ok(ExecutionResult::new(counts, shots))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn table(pairs: &[(u64, u64)]) -> Script {
    Script::Table(Counts::from_pairs(pairs.iter().copied()))
}

fn rate(outcome: &StageOutcome) -> f64 {
    outcome.success_rate().unwrap()
}

#[tokio::test]
async fn noiseless_simulator_always_finds_target() {
    let backend = Arc::new(SimulatorBackend::new().with_seed(7));
    let engine = ExperimentEngine::new(backend, ExperimentConfig::default()).unwrap();
    let report = engine.run().await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.backend(), "simulator");
    for variant in Variant::ALL {
        let stages = report.stages(variant);
        assert_eq!(stages.len(), 3);
        assert!(stages.iter().all(|s| rate(s) == 1.0));
        assert_eq!(report.total_system_success_rate(variant), Metric::Defined(1.0));
    }
    assert_eq!(report.overall_improvement(), Metric::Defined(1.0));

    // Alpha "00" carries two bracket pairs, Beta "11" none.
    let gates: Vec<_> = report
        .stages(Variant::Standard)
        .iter()
        .map(|s| s.gate_count().unwrap())
        .collect();
    assert_eq!(gates, vec![16, 12, 14]);
    let hardened = report.variant(Variant::Hardened).unwrap();
    assert_eq!(hardened.total_gate_count(), 16 + 12 + 14 + 3 * 8);
}

#[tokio::test]
async fn missing_target_scores_zero_and_guards_ratio() {
    let script = (0..6).map(|_| table(&[(0b01, 1000)]));
    let backend = Arc::new(ScriptedBackend::new(script));
    let report = run_experiment(&[0, 3, 2], 2, 1000, InsertionPoint::ALL, backend)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert!(report.stages(Variant::Standard).iter().all(|s| rate(s) == 0.0));
    assert_eq!(
        report.total_system_success_rate(Variant::Standard),
        Metric::Defined(0.0)
    );
    assert_eq!(report.improvement_ratio(0), Metric::Undefined);
    assert_eq!(report.overall_improvement(), Metric::Undefined);
}

#[tokio::test]
async fn totals_follow_multiplicative_model() {
    // Submission order: each stage runs standard then hardened.
    let backend = Arc::new(ScriptedBackend::new([
        table(&[(0b00, 930), (0b01, 70)]),
        table(&[(0b00, 1000)]),
        table(&[(0b11, 845), (0b01, 155)]),
        table(&[(0b11, 1000)]),
        table(&[(0b10, 885), (0b01, 115)]),
        table(&[(0b10, 1000)]),
    ]));
    let report = run_experiment(&[0b00, 0b11, 0b10], 2, 1000, InsertionPoint::ALL, backend)
        .await
        .unwrap();

    let standard = report
        .total_system_success_rate(Variant::Standard)
        .value()
        .unwrap();
    assert!((standard - 0.6955).abs() < 1e-3);
    assert_eq!(
        report.total_system_success_rate(Variant::Hardened),
        Metric::Defined(1.0)
    );

    let overall = report.overall_improvement().value().unwrap();
    assert!((overall - 1.0 / standard).abs() < 1e-9);

    let alpha = report.improvement_ratio(0).value().unwrap();
    assert!((alpha - 1.0 / 0.93).abs() < 1e-9);

    let cumulative = report
        .variant(Variant::Standard)
        .unwrap()
        .cumulative_success();
    assert!((cumulative[1].value().unwrap() - 0.93 * 0.845).abs() < 1e-12);
}

#[tokio::test]
async fn backend_failure_marks_stage_and_run_continues() {
    let backend = Arc::new(ScriptedBackend::new([
        table(&[(0b00, 1000)]),
        Script::Reject(HalError::BackendUnavailable("calibration".into())),
        table(&[(0b11, 1000)]),
        table(&[(0b11, 1000)]),
    ]));
    let config = ExperimentConfig::default().with_targets(&[0b00, 0b11]);
    let report = ExperimentEngine::new(backend, config)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failed_stages(), vec![(Variant::Hardened, 0)]);
    match &report.stages(Variant::Hardened)[0] {
        StageOutcome::Failed(f) => {
            assert_eq!(f.kind, FailureKind::BackendUnavailable);
            assert!(f.message.contains("calibration"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(rate(&report.stages(Variant::Hardened)[1]), 1.0);
    assert_eq!(
        report.total_system_success_rate(Variant::Hardened),
        Metric::Undefined
    );
    assert_eq!(
        report.total_system_success_rate(Variant::Standard),
        Metric::Defined(1.0)
    );
    assert_eq!(report.overall_improvement(), Metric::Undefined);
}

#[tokio::test(start_paused = true)]
async fn hanging_job_times_out_and_is_cancelled() {
    let backend = Arc::new(ScriptedBackend::new([
        Script::Hang,
        table(&[(0b10, 1000)]),
    ]));
    let mut config = ExperimentConfig::default().with_targets(&[0b10]);
    config.stage_timeout_secs = 2;
    config.poll_interval_ms = 100;

    let report = ExperimentEngine::new(backend.clone(), config)
        .unwrap()
        .run()
        .await
        .unwrap();

    match &report.stages(Variant::Standard)[0] {
        StageOutcome::Failed(f) => assert_eq!(f.kind, FailureKind::BackendTimeout),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(backend.cancelled.load(Ordering::SeqCst), 1);
    assert_eq!(rate(&report.stages(Variant::Hardened)[0]), 1.0);
}

#[tokio::test(start_paused = true)]
async fn stalled_submission_is_bounded_by_stage_timeout() {
    let backend = Arc::new(ScriptedBackend::new([Script::Stall, Script::Stall]));
    let mut config = ExperimentConfig::default().with_targets(&[0b01]);
    config.stage_timeout_secs = 5;
    config.poll_interval_ms = 100;

    let report = ExperimentEngine::new(backend.clone(), config)
        .unwrap()
        .run()
        .await
        .unwrap();

    for variant in Variant::ALL {
        match &report.stages(variant)[0] {
            StageOutcome::Failed(f) => assert_eq!(f.kind, FailureKind::BackendTimeout),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
    // No job id was ever handed out, so there is nothing to cancel.
    assert_eq!(backend.cancelled.load(Ordering::SeqCst), 0);
}

#[test]
fn oversized_timeout_is_rejected_before_running() {
    let mut config = ExperimentConfig::default();
    config.stage_timeout_secs = u64::MAX;
    let result = ExperimentEngine::new(Arc::new(SimulatorBackend::new()), config);
    assert!(matches!(result, Err(ExpError::InvalidConfiguration(_))));
}

#[tokio::test]
async fn malformed_counts_are_rejected() {
    let backend = Arc::new(ScriptedBackend::new([
        table(&[(0b11, 999)]),
        table(&[(0b11, 1000)]),
    ]));
    let report = run_experiment(&[0b11], 2, 1000, InsertionPoint::ALL, backend)
        .await
        .unwrap();

    match &report.stages(Variant::Standard)[0] {
        StageOutcome::Failed(f) => assert_eq!(f.kind, FailureKind::MalformedCounts),
        other => panic!("expected malformed counts, got {other:?}"),
    }
    assert!(!report.is_complete());
}

#[tokio::test]
async fn out_of_range_target_fails_only_its_stage() {
    let backend = Arc::new(SimulatorBackend::new());
    let report = run_experiment(&[0b01, 7], 2, 100, InsertionPoint::ALL, backend)
        .await
        .unwrap();

    assert_eq!(
        report.failed_stages(),
        vec![(Variant::Standard, 1), (Variant::Hardened, 1)]
    );
    for variant in Variant::ALL {
        assert_eq!(rate(&report.stages(variant)[0]), 1.0);
        match &report.stages(variant)[1] {
            StageOutcome::Failed(f) => assert_eq!(f.kind, FailureKind::InvalidConfiguration),
            other => panic!("expected configuration failure, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn run_wide_configuration_errors_abort() {
    let backend: Arc<dyn Backend> = Arc::new(SimulatorBackend::new());
    let err = run_experiment(&[0], 2, 0, InsertionPoint::ALL, backend.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ExpError::InvalidConfiguration(_)));

    let err = run_experiment(&[], 2, 100, InsertionPoint::ALL, backend.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ExpError::InvalidConfiguration(_)));

    let err = run_experiment(&[0], 1, 100, InsertionPoint::ALL, backend)
        .await
        .unwrap_err();
    assert!(matches!(err, ExpError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn concurrent_and_sequential_runs_agree() {
    let sequential = ExperimentEngine::new(
        Arc::new(SimulatorBackend::new().with_seed(1)),
        ExperimentConfig::default(),
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let concurrent = ExperimentEngine::new(
        Arc::new(SimulatorBackend::new().with_seed(1)),
        ExperimentConfig::default().with_concurrent_stages(true),
    )
    .unwrap()
    .with_observer(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .run()
    .await
    .unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 6);
    for variant in Variant::ALL {
        let labels = |r: &ddgrover_exp::ExperimentReport| {
            r.stages(variant)
                .iter()
                .map(|s| (s.label().to_string(), s.success_rate()))
                .collect::<Vec<_>>()
        };
        assert_eq!(labels(&sequential), labels(&concurrent));
    }
    assert_eq!(sequential.comparison(), concurrent.comparison());
}

#[tokio::test]
async fn concurrency_falls_back_when_backend_serializes_jobs() {
    let backend = Arc::new(ScriptedBackend::new([
        table(&[(0b10, 500), (0b00, 500)]),
        table(&[(0b10, 1000)]),
    ]));
    let config = ExperimentConfig::default()
        .with_targets(&[0b10])
        .with_concurrent_stages(true);
    let report = ExperimentEngine::new(backend, config)
        .unwrap()
        .run()
        .await
        .unwrap();

    // Sequential order guarantees the scripted tables land on the right variant.
    assert_eq!(rate(&report.stages(Variant::Standard)[0]), 0.5);
    assert_eq!(rate(&report.stages(Variant::Hardened)[0]), 1.0);
    assert_eq!(report.improvement_ratio(0), Metric::Defined(2.0));
}
