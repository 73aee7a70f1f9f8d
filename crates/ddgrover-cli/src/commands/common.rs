//! Shared helpers for CLI commands.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;

use ddgrover_adapter_sim::SimulatorBackend;
use ddgrover_exp::{ExperimentConfig, ExperimentReport, Metric, StageOutcome};
use ddgrover_hal::{Backend, BackendConfig, BackendRegistry};
use ddgrover_ir::{format_bitstring, parse_bitstring};
use ddgrover_synth::{InsertionPoint, Variant};

/// Registry of every backend this build can create.
pub fn create_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<SimulatorBackend>("sim", "local statevector simulator");
    registry
}

/// Instantiate `name`, passing simulator settings through as extras.
pub fn create_backend(
    name: &str,
    seed: Option<u64>,
    noise: Option<f64>,
) -> Result<Arc<dyn Backend>> {
    let mut config = BackendConfig::new(name.to_lowercase());
    if let Some(seed) = seed {
        config = config.with_extra("seed", serde_json::json!(seed));
    }
    if let Some(noise) = noise {
        config = config.with_extra("noise", serde_json::json!(noise));
    }
    create_registry()
        .create(config)
        .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Load the experiment configuration, or the defaults if no file is given.
pub fn load_config(path: Option<&str>) -> Result<ExperimentConfig> {
    let Some(path) = path else {
        return Ok(ExperimentConfig::default());
    };
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    ExperimentConfig::from_path(path).with_context(|| format!("Failed to load config: {path}"))
}

/// Parse a target: `0b`-prefixed MSB-first binary, otherwise decimal.
///
/// Bare digits are always decimal, so `10` is ten at every register width.
pub fn parse_target(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Some(bits) = s.strip_prefix("0b") {
        return Ok(parse_bitstring(bits)?.0);
    }
    s.parse::<u64>()
        .with_context(|| format!("Invalid target '{s}': expected 0b<bits> or a decimal integer"))
}

/// Parse insertion point names; empty input selects all of them.
pub fn parse_insertion_points(names: &[String]) -> Result<BTreeSet<InsertionPoint>> {
    if names.is_empty() {
        return Ok(InsertionPoint::ALL.into_iter().collect());
    }
    names
        .iter()
        .map(|n| n.parse::<InsertionPoint>().map_err(|e| anyhow::anyhow!(e)))
        .collect()
}

/// Format a metric, dimming undefined values.
pub fn format_metric(metric: Metric, precision: usize) -> String {
    match metric {
        Metric::Defined(v) => format!("{v:.precision$}"),
        Metric::Undefined => style("n/a").dim().to_string(),
    }
}

/// One-line summary of a finished stage run.
pub fn format_stage(outcome: &StageOutcome, width: u32) -> String {
    let variant = match outcome.variant() {
        Variant::Standard => style("standard").blue(),
        Variant::Hardened => style("hardened").magenta(),
    };
    match outcome {
        StageOutcome::Completed(r) => {
            let bar: String = "█".repeat((r.success_rate * 25.0).round() as usize);
            format!(
                "  {} {:<8} {:<8} target {}  rate {:>6.3}  gates {:>3}  {}",
                style("✓").green(),
                r.label,
                variant,
                style(format_bitstring(r.target, width)).cyan(),
                r.success_rate,
                r.gate_count,
                style(bar).green()
            )
        }
        StageOutcome::Failed(f) => format!(
            "  {} {:<8} {:<8} target {}  {}: {}",
            style("✗").red(),
            f.label,
            variant,
            style(format_bitstring(f.target, width)).cyan(),
            style(f.kind).red(),
            f.message
        ),
    }
}

/// Print the stage comparison table and the system totals.
pub fn print_report(report: &ExperimentReport) {
    let width = report.qubit_count();

    println!(
        "\n{} Stage comparison ({} shots per stage, backend {}):",
        style("✓").green().bold(),
        report.shots(),
        style(report.backend()).yellow()
    );
    println!(
        "  {:<10} {:<8} {:>10} {:>10} {:>10}",
        "stage", "target", "standard", "hardened", "ratio"
    );
    for row in report.comparison() {
        println!(
            "  {:<10} {:<8} {:>10} {:>10} {:>10}",
            row.label,
            format_bitstring(row.target, width),
            format_metric(row.standard.map_or(Metric::Undefined, Metric::Defined), 3),
            format_metric(row.hardened.map_or(Metric::Undefined, Metric::Defined), 3),
            format_metric(row.improvement, 3)
        );
    }

    println!("\n  Total system success rate:");
    for variant in Variant::ALL {
        let gates = report
            .variant(variant)
            .map_or(0, |v| v.total_gate_count());
        println!(
            "    {:<10} {:>8}   ({} gates)",
            variant.name(),
            format_metric(report.total_system_success_rate(variant), 4),
            gates
        );
    }
    println!(
        "  Overall improvement: {}",
        style(format_metric(report.overall_improvement(), 3)).bold()
    );

    let failed = report.failed_stages();
    if !failed.is_empty() {
        println!(
            "\n  {} {} stage run(s) failed; totals involving them are undefined",
            style("!").yellow().bold(),
            failed.len()
        );
    }
}
