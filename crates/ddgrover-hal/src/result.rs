//! Measurement outcome tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ddgrover_ir::{format_bitstring, parse_bitstring};

use crate::error::{HalError, HalResult};

/// Measurement outcome table: register value → observed count.
///
/// Register values follow the MSB-first convention of target values, so
/// qubit 0 is the most significant bit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<u64, u64>,
}

impl Counts {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(outcome, count)` pairs, summing duplicates.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u64, u64)>) -> Self {
        let mut counts = Self::new();
        for (outcome, count) in pairs {
            counts.insert(outcome, count);
        }
        counts
    }

    /// Build a table from MSB-first bitstrings such as `("10", 512)`.
    pub fn from_bitstrings<'a>(pairs: impl IntoIterator<Item = (&'a str, u64)>) -> HalResult<Self> {
        let mut counts = Self::new();
        for (bits, count) in pairs {
            let (outcome, _) = parse_bitstring(bits)
                .map_err(|e| HalError::MalformedCounts(e.to_string()))?;
            counts.insert(outcome, count);
        }
        Ok(counts)
    }

    /// Add `count` observations of `outcome`, saturating at `u64::MAX`.
    pub fn insert(&mut self, outcome: u64, count: u64) {
        let entry = self.counts.entry(outcome).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Count for `outcome`, zero if never observed.
    pub fn get(&self, outcome: u64) -> u64 {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total_shots(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Outcomes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }

    /// Outcomes sorted by count, most frequent first.
    pub fn sorted(&self) -> Vec<(u64, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }

    /// Most frequent outcome.
    pub fn most_frequent(&self) -> Option<(u64, u64)> {
        self.sorted().into_iter().next()
    }

    /// Entries rendered as `width`-bit strings.
    pub fn to_bitstrings(&self, width: u32) -> Vec<(String, u64)> {
        self.iter()
            .map(|(k, v)| (format_bitstring(k, width), v))
            .collect()
    }

    /// Check the table against the request that produced it.
    ///
    /// Counts must add up to `shots` and every outcome must fit in
    /// `num_qubits` bits.
    pub fn validate(&self, shots: u32, num_qubits: u32) -> HalResult<()> {
        let total = self
            .counts
            .values()
            .try_fold(0u64, |acc, &c| acc.checked_add(c))
            .ok_or_else(|| {
                HalError::MalformedCounts("counts overflow a 64-bit total".into())
            })?;
        if total != u64::from(shots) {
            return Err(HalError::MalformedCounts(format!(
                "counts sum to {total} but {shots} shots were requested"
            )));
        }
        let space = 1u64 << num_qubits;
        if let Some((outcome, _)) = self.iter().find(|&(k, _)| k >= space) {
            return Err(HalError::MalformedCounts(format!(
                "outcome {outcome} outside the {num_qubits}-qubit register"
            )));
        }
        Ok(())
    }
}

/// Result of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement outcome table.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Backend-reported execution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a new result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
        }
    }

    /// Attach the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }
}
