//! Experiment reports.
//!
//! An [`ExperimentReport`] is assembled once, after every stage has finished,
//! and is read-only afterwards: all fields are private and exposed through
//! accessors. Serialization uses stable snake_case field names and keys the
//! variant map by `standard` / `hardened`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ddgrover_synth::{InsertionPoint, Variant};

use crate::metric::Metric;
use crate::stage::StageOutcome;

/// Current report schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Product of the stage success rates; undefined if any stage failed.
pub fn total_system_success_rate(outcomes: &[StageOutcome]) -> Metric {
    Metric::product(outcomes.iter().map(StageOutcome::success_rate))
}

/// Hardened rate over standard rate for one stage.
///
/// Undefined when either stage failed or the standard rate is zero.
pub fn improvement_ratio(standard: &StageOutcome, hardened: &StageOutcome) -> Metric {
    match (standard.success_rate(), hardened.success_rate()) {
        (Some(s), Some(h)) => Metric::ratio(h, s),
        _ => Metric::Undefined,
    }
}

/// Everything measured for one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantReport {
    stages: Vec<StageOutcome>,
    total_system_success_rate: Metric,
    cumulative_success: Vec<Metric>,
    total_gate_count: usize,
    total_elapsed_ms: u64,
}

impl VariantReport {
    /// Derive the cumulative metrics from ordered stage outcomes.
    pub fn new(stages: Vec<StageOutcome>) -> Self {
        let total_system_success_rate = total_system_success_rate(&stages);
        let cumulative_success =
            Metric::running_product(stages.iter().map(StageOutcome::success_rate));
        let total_gate_count = stages.iter().filter_map(StageOutcome::gate_count).sum();
        let total_elapsed_ms = stages
            .iter()
            .filter_map(StageOutcome::result)
            .map(|r| r.elapsed_ms)
            .sum();
        Self {
            stages,
            total_system_success_rate,
            cumulative_success,
            total_gate_count,
            total_elapsed_ms,
        }
    }

    /// Stage outcomes in execution order.
    pub fn stages(&self) -> &[StageOutcome] {
        &self.stages
    }

    /// Product of all stage rates.
    pub fn total_system_success_rate(&self) -> Metric {
        self.total_system_success_rate
    }

    /// Running product through each stage.
    pub fn cumulative_success(&self) -> &[Metric] {
        &self.cumulative_success
    }

    /// Sum of circuit sizes over completed stages.
    pub fn total_gate_count(&self) -> usize {
        self.total_gate_count
    }

    /// Sum of adapter time over completed stages.
    pub fn total_elapsed_ms(&self) -> u64 {
        self.total_elapsed_ms
    }

    /// Indices of failed stages.
    pub fn failed_stages(&self) -> Vec<usize> {
        self.stages
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_failed())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Side-by-side view of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageComparison {
    /// Stage position.
    pub index: usize,
    /// Stage name.
    pub label: String,
    /// Value searched for.
    pub target: u64,
    /// Standard rate, absent on failure.
    pub standard: Option<f64>,
    /// Hardened rate, absent on failure.
    pub hardened: Option<f64>,
    /// Hardened over standard.
    pub improvement: Metric,
}

/// Result of a full experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    schema_version: String,
    timestamp: DateTime<Utc>,
    backend: String,
    qubit_count: u32,
    shots: u32,
    iterations: u32,
    insertion_points: Vec<InsertionPoint>,
    variants: BTreeMap<Variant, VariantReport>,
    comparison: Vec<StageComparison>,
    overall_improvement: Metric,
}

/// Run metadata recorded alongside the measurements.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    /// Backend name.
    pub backend: String,
    /// Register width.
    pub qubit_count: u32,
    /// Shots per stage.
    pub shots: u32,
    /// Oracle + diffusion rounds.
    pub iterations: u32,
    /// Hardened insertion points.
    pub insertion_points: Vec<InsertionPoint>,
}

impl ExperimentReport {
    /// Assemble a report from per-variant outcomes in stage order.
    ///
    /// Both vectors must describe the same stages in the same order.
    pub fn new(
        header: ReportHeader,
        standard: Vec<StageOutcome>,
        hardened: Vec<StageOutcome>,
    ) -> Self {
        let comparison = standard
            .iter()
            .zip(&hardened)
            .enumerate()
            .map(|(index, (s, h))| StageComparison {
                index,
                label: s.label().to_string(),
                target: s.target(),
                standard: s.success_rate(),
                hardened: h.success_rate(),
                improvement: improvement_ratio(s, h),
            })
            .collect();

        let standard = VariantReport::new(standard);
        let hardened = VariantReport::new(hardened);
        let overall_improvement = Metric::ratio_of(
            hardened.total_system_success_rate(),
            standard.total_system_success_rate(),
        );

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp: Utc::now(),
            backend: header.backend,
            qubit_count: header.qubit_count,
            shots: header.shots,
            iterations: header.iterations,
            insertion_points: header.insertion_points,
            variants: BTreeMap::from([
                (Variant::Standard, standard),
                (Variant::Hardened, hardened),
            ]),
            comparison,
            overall_improvement,
        }
    }

    /// Report schema version.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Time the report was assembled.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Backend the stages ran on.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Register width.
    pub fn qubit_count(&self) -> u32 {
        self.qubit_count
    }

    /// Shots per stage.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Oracle + diffusion rounds.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hardened insertion points.
    pub fn insertion_points(&self) -> &[InsertionPoint] {
        &self.insertion_points
    }

    /// Per-variant results.
    pub fn variant(&self, variant: Variant) -> Option<&VariantReport> {
        self.variants.get(&variant)
    }

    /// Stage outcomes for `variant`, empty if absent.
    pub fn stages(&self, variant: Variant) -> &[StageOutcome] {
        self.variant(variant).map(VariantReport::stages).unwrap_or(&[])
    }

    /// Product of stage rates for `variant`.
    pub fn total_system_success_rate(&self, variant: Variant) -> Metric {
        self.variant(variant)
            .map(VariantReport::total_system_success_rate)
            .unwrap_or(Metric::Undefined)
    }

    /// Hardened over standard for stage `index`.
    pub fn improvement_ratio(&self, index: usize) -> Metric {
        self.comparison
            .get(index)
            .map(|c| c.improvement)
            .unwrap_or(Metric::Undefined)
    }

    /// Hardened total over standard total.
    pub fn overall_improvement(&self) -> Metric {
        self.overall_improvement
    }

    /// Stage-by-stage comparison rows.
    pub fn comparison(&self) -> &[StageComparison] {
        &self.comparison
    }

    /// `(variant, stage index)` of every failed stage.
    pub fn failed_stages(&self) -> Vec<(Variant, usize)> {
        self.variants
            .iter()
            .flat_map(|(&v, r)| r.failed_stages().into_iter().map(move |i| (v, i)))
            .collect()
    }

    /// Whether every stage of both variants completed.
    pub fn is_complete(&self) -> bool {
        self.failed_stages().is_empty()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
