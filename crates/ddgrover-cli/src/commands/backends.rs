//! Backends command implementation.

use anyhow::Result;
use console::style;

use ddgrover_hal::BackendConfig;

use super::common::create_registry;

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("ddgrover").cyan().bold());

    let registry = create_registry();
    for (name, description) in registry.list() {
        let backend = match registry.create(BackendConfig::new(name.as_str())) {
            Ok(b) => b,
            Err(e) => {
                println!("  {} {} ({e})", style("○").dim(), style(&name).dim());
                continue;
            }
        };
        let caps = backend.capabilities();
        let available = backend.availability().await.is_ok_and(|a| a.is_available);

        println!(
            "  {} {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(&name).bold(),
            if caps.is_simulator { "(local)" } else { "" }
        );
        println!("    {description}");
        println!("    Qubits: {}", caps.num_qubits);
        println!("    Max shots: {}", caps.max_shots);
        println!("    Gates: {}", caps.gate_set.join(", "));
        println!(
            "    Concurrent jobs: {}",
            if caps.supports_concurrent_jobs { "yes" } else { "no" }
        );
        println!();
    }

    Ok(())
}
