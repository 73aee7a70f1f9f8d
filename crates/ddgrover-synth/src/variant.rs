//! Algorithm variants and their descriptors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Where a decoupling block is spliced into the search skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionPoint {
    /// After superposition, before the first oracle.
    PreOracle,
    /// After the last diffusion round.
    PostDiffusion,
}

impl InsertionPoint {
    /// Every insertion point, in circuit order.
    pub const ALL: [InsertionPoint; 2] = [InsertionPoint::PreOracle, InsertionPoint::PostDiffusion];

    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            InsertionPoint::PreOracle => "pre_oracle",
            InsertionPoint::PostDiffusion => "post_diffusion",
        }
    }
}

impl fmt::Display for InsertionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InsertionPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pre_oracle" | "pre" => Ok(InsertionPoint::PreOracle),
            "post_diffusion" | "post" => Ok(InsertionPoint::PostDiffusion),
            other => Err(format!(
                "unknown insertion point '{other}' (expected pre_oracle or post_diffusion)"
            )),
        }
    }
}

/// The two algorithm variants under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Plain Grover search, no decoupling.
    Standard,
    /// Grover search with decoupling blocks at the configured points.
    Hardened,
}

impl Variant {
    /// Both variants, standard first.
    pub const ALL: [Variant; 2] = [Variant::Standard, Variant::Hardened];

    /// Report name.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Hardened => "hardened",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the assembler needs to build one search circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    /// Value the search should find.
    pub target: u64,
    /// Register width.
    pub qubit_count: u32,
    /// Decoupling insertion points; empty for the standard variant.
    pub insertion_points: BTreeSet<InsertionPoint>,
    /// Oracle + diffusion rounds.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_iterations() -> u32 {
    1
}

impl VariantDescriptor {
    /// Standard variant: no insertion points.
    pub fn standard(target: u64, qubit_count: u32) -> Self {
        Self {
            target,
            qubit_count,
            insertion_points: BTreeSet::new(),
            iterations: 1,
        }
    }

    /// Hardened variant with the given insertion points.
    pub fn hardened(
        target: u64,
        qubit_count: u32,
        insertion_points: impl IntoIterator<Item = InsertionPoint>,
    ) -> Self {
        Self {
            target,
            qubit_count,
            insertion_points: insertion_points.into_iter().collect(),
            iterations: 1,
        }
    }

    /// Descriptor for `variant`, using `insertion_points` only when hardened.
    pub fn for_variant(
        variant: Variant,
        target: u64,
        qubit_count: u32,
        insertion_points: &BTreeSet<InsertionPoint>,
    ) -> Self {
        match variant {
            Variant::Standard => Self::standard(target, qubit_count),
            Variant::Hardened => {
                Self::hardened(target, qubit_count, insertion_points.iter().copied())
            }
        }
    }

    /// Set the number of oracle + diffusion rounds.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Which variant this descriptor describes.
    pub fn variant(&self) -> Variant {
        if self.insertion_points.is_empty() {
            Variant::Standard
        } else {
            Variant::Hardened
        }
    }

    /// Whether a decoupling block goes in at `point`.
    pub fn uses(&self, point: InsertionPoint) -> bool {
        self.insertion_points.contains(&point)
    }
}
