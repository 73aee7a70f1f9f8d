//! Backend trait and configuration.
//!
//! The [`Backend`] trait is the core's only view of an execution backend:
//!
//! ```text
//!   capabilities() ──→ availability() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)         (async)          (async)      (async)      (async)
//! ```
//!
//! The provided [`Backend::execute`] runs the whole lifecycle and returns the
//! measurement outcome table, which is all the experiment harness needs.
//!
//! ## Method table
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `check_circuit()` | sync | provided | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |
//! | `execute()` | async | provided | `HalResult<Counts>` |

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ddgrover_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::{Counts, ExecutionResult};

/// Configuration for a backend instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Adapter-specific settings.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// How long to poll a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Give up (and cancel) after this long.
    pub timeout: Duration,
}

impl WaitPolicy {
    /// Create a policy.
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }
}

impl Default for WaitPolicy {
    /// 500ms polls for up to 5 minutes.
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Trait for execution backends.
///
/// # Contract
///
/// - `capabilities()` is synchronous and infallible; cache at construction.
/// - `submit()` returns a `JobId` whose initial status is `Queued`.
/// - `result()` is only called once `status()` reports `Completed`, and the
///   counts it returns sum to the submitted shot count.
/// - Circuits are received by shared reference and never modified.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check whether the backend is accepting jobs.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Submit a circuit for execution.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Check `circuit` and `shots` against [`Backend::capabilities`].
    fn check_circuit(&self, circuit: &Circuit, shots: u32) -> HalResult<()> {
        let caps = self.capabilities();

        if shots == 0 || shots > caps.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, backend accepts 1..={}",
                caps.max_shots
            )));
        }
        if circuit.num_qubits() > caps.num_qubits {
            return Err(HalError::RejectedCircuit(format!(
                "circuit has {} qubits but {} only supports {}",
                circuit.num_qubits(),
                self.name(),
                caps.num_qubits
            )));
        }
        if let Some(max_ops) = caps.max_circuit_ops {
            if circuit.num_ops() > max_ops as usize {
                return Err(HalError::RejectedCircuit(format!(
                    "circuit has {} operations but {} allows at most {max_ops}",
                    circuit.num_ops(),
                    self.name()
                )));
            }
        }
        if let Some(gate) = circuit
            .operations()
            .iter()
            .find(|g| !caps.supports_gate(g.name()))
        {
            return Err(HalError::RejectedCircuit(format!(
                "gate '{}' not supported by {}",
                gate.name(),
                self.name()
            )));
        }
        Ok(())
    }

    /// Poll a job until it completes, fails, or `policy.timeout` elapses.
    ///
    /// A timeout too large to place on the clock polls without a deadline.
    async fn wait(&self, job_id: &JobId, policy: &WaitPolicy) -> HalResult<ExecutionResult> {
        let deadline = tokio::time::Instant::now().checked_add(policy.timeout);

        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                        return Err(HalError::Timeout(job_id.0.clone()));
                    }
                    tokio::time::sleep(policy.poll_interval).await;
                }
            }
        }
    }

    /// Run `circuit` for `shots` shots and return its outcome table.
    ///
    /// A job that outlives `policy.timeout` is cancelled on a best-effort
    /// basis before `HalError::Timeout` is returned.
    async fn execute(
        &self,
        circuit: &Circuit,
        shots: u32,
        policy: &WaitPolicy,
    ) -> HalResult<Counts> {
        self.check_circuit(circuit, shots)?;

        let availability = self.availability().await?;
        if !availability.is_available {
            return Err(HalError::BackendUnavailable(
                availability
                    .status_message
                    .unwrap_or_else(|| self.name().to_string()),
            ));
        }

        let job_id = self.submit(circuit, shots).await?;
        debug!(backend = self.name(), job = %job_id, shots, "job submitted");

        match self.wait(&job_id, policy).await {
            Ok(result) => Ok(result.counts),
            Err(HalError::Timeout(id)) => {
                if let Err(e) = self.cancel(&job_id).await {
                    warn!(backend = self.name(), job = %job_id, "cancel after timeout failed: {e}");
                }
                Err(HalError::Timeout(id))
            }
            Err(e) => Err(e),
        }
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a backend that is always ready, such as a simulator.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// Availability of an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Backend whose jobs stay queued for a fixed number of polls.
    struct SlowBackend {
        capabilities: Capabilities,
        polls_until_done: u32,
        polls: Mutex<u32>,
        cancelled: Mutex<bool>,
        available: bool,
    }

    impl SlowBackend {
        fn new(polls_until_done: u32) -> Self {
            Self {
                capabilities: Capabilities::simulator(2).with_max_circuit_ops(32),
                polls_until_done,
                polls: Mutex::new(0),
                cancelled: Mutex::new(false),
                available: true,
            }
        }
    }

    #[async_trait]
    impl Backend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        fn capabilities(&self) -> &Capabilities {
            &self.capabilities
        }

        async fn availability(&self) -> HalResult<BackendAvailability> {
            if self.available {
                Ok(BackendAvailability::always_available())
            } else {
                Ok(BackendAvailability::unavailable("maintenance"))
            }
        }

        async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
            Ok(JobId::new("slow-1"))
        }

        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            let mut polls = self.polls.lock().unwrap();
            *polls += 1;
            if *polls > self.polls_until_done {
                Ok(JobStatus::Completed)
            } else {
                Ok(JobStatus::Running)
            }
        }

        async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
            Ok(ExecutionResult::new(Counts::from_pairs([(3, 100)]), 100))
        }

        async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
            *self.cancelled.lock().unwrap() = true;
            Ok(())
        }
    }

    fn two_qubit_circuit() -> Circuit {
        let mut circuit = Circuit::new(2).unwrap();
        circuit.h(ddgrover_ir::QubitId(0)).unwrap();
        circuit
    }

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("sim").with_extra("seed", serde_json::json!(7));
        assert_eq!(config.name, "sim");
        assert_eq!(config.extra.get("seed"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn test_backend_availability() {
        let avail = BackendAvailability::always_available();
        assert!(avail.is_available);
        assert_eq!(avail.estimated_wait, Some(Duration::ZERO));

        let avail = BackendAvailability::unavailable("maintenance");
        assert!(!avail.is_available);
        assert_eq!(avail.status_message.as_deref(), Some("maintenance"));
    }

    #[test]
    fn test_check_circuit_limits() {
        let backend = SlowBackend::new(0);
        let circuit = two_qubit_circuit();
        assert!(backend.check_circuit(&circuit, 100).is_ok());
        assert!(matches!(
            backend.check_circuit(&circuit, 0),
            Err(HalError::InvalidShots(_))
        ));

        let wide = Circuit::new(3).unwrap();
        assert!(matches!(
            backend.check_circuit(&wide, 100),
            Err(HalError::RejectedCircuit(_))
        ));

        let mut long = Circuit::new(2).unwrap();
        for _ in 0..33 {
            long.x(ddgrover_ir::QubitId(0)).unwrap();
        }
        assert!(matches!(
            backend.check_circuit(&long, 100),
            Err(HalError::RejectedCircuit(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_polls_until_complete() {
        let backend = SlowBackend::new(3);
        let counts = backend
            .execute(&two_qubit_circuit(), 100, &WaitPolicy::default())
            .await
            .unwrap();
        assert_eq!(counts.get(3), 100);
        assert!(!*backend.cancelled.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_times_out_and_cancels() {
        let backend = SlowBackend::new(u32::MAX);
        let policy = WaitPolicy::new(Duration::from_millis(100), Duration::from_secs(1));
        let err = backend
            .execute(&two_qubit_circuit(), 100, &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Timeout(_)));
        assert!(*backend.cancelled.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_with_unrepresentable_deadline() {
        let backend = SlowBackend::new(2);
        let policy = WaitPolicy::new(Duration::from_millis(100), Duration::MAX);
        let counts = backend
            .execute(&two_qubit_circuit(), 100, &policy)
            .await
            .unwrap();
        assert_eq!(counts.get(3), 100);
    }

    #[tokio::test]
    async fn test_execute_unavailable_backend() {
        let mut backend = SlowBackend::new(0);
        backend.available = false;
        let err = backend
            .execute(&two_qubit_circuit(), 100, &WaitPolicy::default())
            .await
            .unwrap_err();
        assert_eq!(err, HalError::BackendUnavailable("maintenance".into()));
    }
}
