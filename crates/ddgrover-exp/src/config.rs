//! Experiment configuration.
//!
//! Loaded from YAML or JSON; every field has a default so a partial file only
//! overrides what it names. The defaults reproduce the reference three-stage
//! run on a two-qubit register.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use ddgrover_hal::WaitPolicy;
use ddgrover_ir::{MAX_QUBITS, format_bitstring, parse_bitstring};
use ddgrover_synth::InsertionPoint;

use crate::error::{ExpError, ExpResult};

/// Longest accepted stage timeout (one day).
pub const MAX_STAGE_TIMEOUT_SECS: u64 = 86_400;

/// Longest accepted delay between status polls (one minute).
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// Full description of a multi-stage experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Register width shared by every stage.
    pub qubit_count: u32,
    /// Shots per stage and variant.
    pub shots: u32,
    /// Stages, executed in order.
    pub stages: Vec<StageSpec>,
    /// Where the hardened variant receives decoupling blocks.
    pub insertion_points: BTreeSet<InsertionPoint>,
    /// Oracle + diffusion rounds per circuit.
    pub iterations: u32,
    /// Submit all stage runs at once when the backend allows it.
    pub concurrent_stages: bool,
    /// Upper bound on a single stage's adapter call.
    pub stage_timeout_secs: u64,
    /// Delay between job status polls.
    pub poll_interval_ms: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            qubit_count: 2,
            shots: 1000,
            stages: vec![
                StageSpec::bits("Alpha", "00"),
                StageSpec::bits("Beta", "11"),
                StageSpec::bits("Gamma", "10"),
            ],
            insertion_points: InsertionPoint::ALL.into_iter().collect(),
            iterations: 1,
            concurrent_stages: false,
            stage_timeout_secs: 300,
            poll_interval_ms: 500,
        }
    }
}

impl ExperimentConfig {
    /// Load a configuration file. `.json` is parsed as JSON, anything else as
    /// YAML.
    pub fn from_path(path: impl AsRef<Path>) -> ExpResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ExpError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> ExpResult<Self> {
        serde_yaml_ng::from_str(text).map_err(|e| ExpError::Parse(e.to_string()))
    }

    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> ExpResult<Self> {
        serde_json::from_str(text).map_err(|e| ExpError::Parse(e.to_string()))
    }

    /// Replace the stages with unlabelled numeric targets.
    ///
    /// Stages are named `Stage 1`, `Stage 2`, ...
    pub fn with_targets(mut self, targets: &[u64]) -> Self {
        self.stages = targets
            .iter()
            .enumerate()
            .map(|(i, &t)| StageSpec::value(format!("Stage {}", i + 1), t))
            .collect();
        self
    }

    /// Set the shots per stage.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the register width.
    pub fn with_qubit_count(mut self, qubit_count: u32) -> Self {
        self.qubit_count = qubit_count;
        self
    }

    /// Set the hardened insertion points.
    pub fn with_insertion_points(
        mut self,
        points: impl IntoIterator<Item = InsertionPoint>,
    ) -> Self {
        self.insertion_points = points.into_iter().collect();
        self
    }

    /// Enable or disable concurrent stage submission.
    pub fn with_concurrent_stages(mut self, concurrent: bool) -> Self {
        self.concurrent_stages = concurrent;
        self
    }

    /// Polling policy handed to the adapter.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.stage_timeout_secs),
        )
    }

    /// Check run-wide settings and resolve every stage target.
    ///
    /// Numeric targets are passed through unchecked: an out-of-range value
    /// fails only its own stage when the circuit is built.
    pub fn validate(&self) -> ExpResult<Vec<ResolvedStage>> {
        if self.qubit_count < 2 || self.qubit_count > MAX_QUBITS {
            return Err(ExpError::InvalidConfiguration(format!(
                "qubit_count must be in 2..={MAX_QUBITS}, got {}",
                self.qubit_count
            )));
        }
        if self.shots == 0 {
            return Err(ExpError::InvalidConfiguration(
                "shots must be positive".into(),
            ));
        }
        if self.stages.is_empty() {
            return Err(ExpError::InvalidConfiguration(
                "at least one stage is required".into(),
            ));
        }
        if self.insertion_points.is_empty() {
            return Err(ExpError::InvalidConfiguration(
                "the hardened variant needs at least one insertion point".into(),
            ));
        }
        if self.iterations == 0 {
            return Err(ExpError::InvalidConfiguration(
                "iterations must be positive".into(),
            ));
        }
        if self.stage_timeout_secs == 0 || self.stage_timeout_secs > MAX_STAGE_TIMEOUT_SECS {
            return Err(ExpError::InvalidConfiguration(format!(
                "stage_timeout_secs must be in 1..={MAX_STAGE_TIMEOUT_SECS}, got {}",
                self.stage_timeout_secs
            )));
        }
        if self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(ExpError::InvalidConfiguration(format!(
                "poll_interval_ms must be at most {MAX_POLL_INTERVAL_MS}, got {}",
                self.poll_interval_ms
            )));
        }

        self.stages
            .iter()
            .enumerate()
            .map(|(index, stage)| {
                Ok(ResolvedStage {
                    index,
                    label: stage.label.clone(),
                    target: stage.target.resolve(self.qubit_count)?,
                })
            })
            .collect()
    }
}

/// One stage as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Display name.
    pub label: String,
    /// Value to search for.
    pub target: TargetSpec,
}

impl StageSpec {
    /// Stage with a numeric target.
    pub fn value(label: impl Into<String>, target: u64) -> Self {
        Self {
            label: label.into(),
            target: TargetSpec::Value(target),
        }
    }

    /// Stage with a bitstring target.
    pub fn bits(label: impl Into<String>, bits: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: TargetSpec::Bits(bits.into()),
        }
    }
}

/// A stage target, either an integer or an MSB-first bitstring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    /// Integer target.
    Value(u64),
    /// Bitstring such as `"10"`; its width must match the register.
    Bits(String),
}

impl TargetSpec {
    /// Integer value of this target.
    pub fn resolve(&self, qubit_count: u32) -> ExpResult<u64> {
        match self {
            TargetSpec::Value(v) => Ok(*v),
            TargetSpec::Bits(s) => {
                let (value, width) = parse_bitstring(s)?;
                if width != qubit_count {
                    return Err(ExpError::InvalidConfiguration(format!(
                        "target \"{s}\" has {width} bits but the register has {qubit_count}"
                    )));
                }
                Ok(value)
            }
        }
    }
}

/// A stage after target resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStage {
    /// Position in the stage list.
    pub index: usize,
    /// Display name.
    pub label: String,
    /// Integer target.
    pub target: u64,
}

impl ResolvedStage {
    /// Target rendered for a `width`-qubit register.
    pub fn target_bits(&self, width: u32) -> String {
        format_bitstring(self.target, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reproduce_reference_run() {
        let config = ExperimentConfig::default();
        let stages = config.validate().unwrap();
        let targets: Vec<_> = stages.iter().map(|s| (s.label.as_str(), s.target)).collect();
        assert_eq!(targets, vec![("Alpha", 0), ("Beta", 3), ("Gamma", 2)]);
        assert_eq!(config.shots, 1000);
        assert_eq!(config.insertion_points.len(), 2);
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
shots: 200
stages:
  - label: One
    target: 3
  - label: Two
    target: "01"
insertion_points: [post_diffusion]
"#;
        let config = ExperimentConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.shots, 200);
        assert_eq!(config.qubit_count, 2);
        assert_eq!(
            config.insertion_points,
            BTreeSet::from([InsertionPoint::PostDiffusion])
        );
        let stages = config.validate().unwrap();
        assert_eq!(stages[0].target, 3);
        assert_eq!(stages[1].target, 1);
        assert_eq!(stages[1].target_bits(2), "01");
    }

    #[test]
    fn test_json_config() {
        let json = r#"{"qubit_count": 3, "stages": [{"label": "A", "target": "101"}]}"#;
        let config = ExperimentConfig::from_json_str(json).unwrap();
        assert_eq!(config.validate().unwrap()[0].target, 5);
    }

    #[test]
    fn test_run_wide_errors() {
        let base = ExperimentConfig::default();
        assert!(base.clone().with_shots(0).validate().is_err());
        assert!(base.clone().with_targets(&[]).validate().is_err());
        assert!(base.clone().with_qubit_count(1).validate().is_err());
        assert!(base.clone().with_qubit_count(64).validate().is_err());
        assert!(
            base.clone()
                .with_insertion_points([])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_timing_limits() {
        let mut config = ExperimentConfig::default();
        config.stage_timeout_secs = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ExpError::InvalidConfiguration(_))
        ));

        config.stage_timeout_secs = MAX_STAGE_TIMEOUT_SECS;
        assert!(config.validate().is_ok());

        config.poll_interval_ms = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ExpError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bitstring_width_must_match() {
        let config = ExperimentConfig::default().with_qubit_count(3);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ExpError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_numeric_target_not_checked_here() {
        let config = ExperimentConfig::default().with_targets(&[9]);
        let stages = config.validate().unwrap();
        assert_eq!(stages[0].label, "Stage 1");
        assert_eq!(stages[0].target, 9);
    }

    #[test]
    fn test_wait_policy() {
        let policy = ExperimentConfig::default().wait_policy();
        assert_eq!(policy.poll_interval, Duration::from_millis(500));
        assert_eq!(policy.timeout, Duration::from_secs(300));
    }
}
