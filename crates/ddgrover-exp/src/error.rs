//! Error types for the experiment crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use ddgrover_hal::HalError;
use ddgrover_ir::IrError;

/// Errors that can occur while configuring or running an experiment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExpError {
    /// Malformed experiment or stage configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Circuit construction rejected the descriptor.
    #[error("Invalid configuration: {0}")]
    Circuit(#[from] IrError),

    /// The execution adapter failed.
    #[error(transparent)]
    Backend(#[from] HalError),

    /// Configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ExpError {
    /// Classify this error for stage reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            ExpError::InvalidConfiguration(_)
            | ExpError::Circuit(_)
            | ExpError::Io { .. }
            | ExpError::Parse(_) => FailureKind::InvalidConfiguration,
            ExpError::Backend(e) => match e {
                HalError::BackendUnavailable(_) => FailureKind::BackendUnavailable,
                HalError::Timeout(_) => FailureKind::BackendTimeout,
                HalError::RejectedCircuit(_) | HalError::InvalidShots(_) => {
                    FailureKind::BackendRejectedCircuit
                }
                HalError::MalformedCounts(_) => FailureKind::MalformedCounts,
                _ => FailureKind::BackendError,
            },
        }
    }
}

/// Why a stage produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Descriptor could not be turned into a circuit.
    InvalidConfiguration,
    /// Backend unreachable or offline.
    BackendUnavailable,
    /// Backend did not finish in time; the job was abandoned.
    BackendTimeout,
    /// Backend refused the circuit or shot count.
    BackendRejectedCircuit,
    /// Backend returned an outcome table that breaks the counts contract.
    MalformedCounts,
    /// Any other backend failure, including cancelled jobs.
    BackendError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::InvalidConfiguration => "invalid configuration",
            FailureKind::BackendUnavailable => "backend unavailable",
            FailureKind::BackendTimeout => "backend timeout",
            FailureKind::BackendRejectedCircuit => "circuit rejected",
            FailureKind::MalformedCounts => "malformed counts",
            FailureKind::BackendError => "backend error",
        };
        f.write_str(name)
    }
}

/// Result type for experiment operations.
pub type ExpResult<T> = Result<T, ExpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            ExpError::from(IrError::NoQubits).kind(),
            FailureKind::InvalidConfiguration
        );
        assert_eq!(
            ExpError::from(HalError::Timeout("job".into())).kind(),
            FailureKind::BackendTimeout
        );
        assert_eq!(
            ExpError::from(HalError::BackendUnavailable("down".into())).kind(),
            FailureKind::BackendUnavailable
        );
        assert_eq!(
            ExpError::from(HalError::RejectedCircuit("too wide".into())).kind(),
            FailureKind::BackendRejectedCircuit
        );
        assert_eq!(
            ExpError::from(HalError::JobCancelled).kind(),
            FailureKind::BackendError
        );
    }
}
