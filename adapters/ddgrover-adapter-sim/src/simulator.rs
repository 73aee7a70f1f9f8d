//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use ddgrover_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus,
};
use ddgrover_ir::Circuit;

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local statevector backend.
///
/// Jobs run to completion inside `submit`, so `status` reports `Completed`
/// on the first poll.
pub struct SimulatorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    rng: Mutex<StdRng>,
    noise: f64,
}

impl SimulatorBackend {
    /// Noiseless simulator with an entropy-seeded sampler.
    pub fn new() -> Self {
        Self::with_config(BackendConfig::new("simulator"), DEFAULT_MAX_QUBITS)
    }

    /// Simulator accepting at most `max_qubits` qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::with_config(BackendConfig::new("simulator"), max_qubits)
    }

    fn with_config(config: BackendConfig, max_qubits: u32) -> Self {
        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name.clone_from(&config.name);
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            rng: Mutex::new(StdRng::from_entropy()),
            noise: 0.0,
        }
    }

    /// Fix the sampler seed.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Per-gate bit-flip probability, clamped to `[0, 1]`.
    pub fn with_noise(mut self, probability: f64) -> Self {
        self.noise = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    /// Configured bit-flip probability.
    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(qubits = circuit.num_qubits(), ops = circuit.num_ops()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = Instant::now();
        let num_qubits = circuit.num_qubits() as usize;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut counts = Counts::new();

        if self.noise == 0.0 {
            let mut sv = Statevector::new(num_qubits);
            for gate in circuit.operations() {
                sv.apply(gate);
            }
            for _ in 0..shots {
                counts.insert(sv.register_value(sv.sample(&mut *rng)), 1);
            }
        } else {
            for shot in 0..shots {
                let mut sv = Statevector::new(num_qubits);
                for gate in circuit.operations() {
                    sv.apply_noisy(gate, self.noise, &mut *rng);
                }
                counts.insert(sv.register_value(sv.sample(&mut *rng)), 1);

                if shot > 0 && shot % 1000 == 0 {
                    debug!("Completed {} shots", shot);
                }
            }
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64)
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        self.check_circuit(circuit, shots)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::queued(job_id.clone(), shots);
        self.lock_jobs().insert(
            job_id.0.clone(),
            SimJob { job, result: None },
        );
        debug!("Submitted job: {}", job_id);

        let result = self.run_simulation(circuit, shots);

        if let Some(sim_job) = self.lock_jobs().get_mut(&job_id.0) {
            sim_job.result = Some(result);
            sim_job.job.transition(JobStatus::Completed);
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.lock_jobs()
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.lock_jobs()
            .get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        match self.lock_jobs().get_mut(&job_id.0) {
            Some(sim_job) => {
                sim_job.job.transition(JobStatus::Cancelled);
                Ok(())
            }
            None => Err(HalError::JobNotFound(job_id.0.clone())),
        }
    }
}

impl BackendFactory for SimulatorBackend {
    /// Reads `max_qubits`, `seed` and `noise` from the extra settings.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = config
            .extra
            .get("max_qubits")
            .and_then(serde_json::Value::as_u64)
            .map_or(DEFAULT_MAX_QUBITS, |v| v as u32);
        let seed = config.extra.get("seed").and_then(serde_json::Value::as_u64);
        let noise = match config.extra.get("noise") {
            None => 0.0,
            Some(v) => match v.as_f64() {
                Some(p) if (0.0..=1.0).contains(&p) => p,
                _ => {
                    return Err(HalError::Configuration(format!(
                        "noise must be a probability in [0, 1], got {v}"
                    )));
                }
            },
        };

        let backend = Self::with_config(config, max_qubits).with_noise(noise);
        Ok(match seed {
            Some(seed) => backend.with_seed(seed),
            None => backend,
        })
    }
}
