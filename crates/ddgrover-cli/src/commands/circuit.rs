//! Circuit command implementation.

use anyhow::Result;
use console::style;

use ddgrover_ir::format_bitstring;
use ddgrover_synth::{Assembler, Variant, VariantDescriptor};

use super::common::{parse_insertion_points, parse_target};

/// Execute the circuit command.
pub fn execute(
    target: &str,
    qubits: u32,
    hardened: bool,
    insertion: &[String],
    iterations: u32,
    format: &str,
) -> Result<()> {
    let target = parse_target(target)?;
    let variant = if hardened || !insertion.is_empty() {
        Variant::Hardened
    } else {
        Variant::Standard
    };
    let points = parse_insertion_points(insertion)?;
    let descriptor = VariantDescriptor::for_variant(variant, target, qubits, &points)
        .with_iterations(iterations);
    let assembled = Assembler::assemble(&descriptor)?;

    match format.to_lowercase().as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&assembled)?),
        "text" => {
            println!(
                "{} {} search for {} ({} gates, {} decoupling blocks)",
                style("✓").green().bold(),
                style(assembled.variant).bold(),
                style(format_bitstring(target, qubits)).cyan(),
                assembled.gate_count,
                assembled.decoupling_blocks
            );
            let ops = assembled.circuit.count_ops();
            let summary: Vec<String> = ops.iter().map(|(g, n)| format!("{g}: {n}")).collect();
            println!("  {}\n", style(summary.join(", ")).dim());
            print!("{}", assembled.circuit);
        }
        other => anyhow::bail!("Unknown format: '{other}'. Available: text, json"),
    }

    Ok(())
}
