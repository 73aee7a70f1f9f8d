//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - standard vs. decoupled Grover search",
        style("ddgrover").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  ddgrover-ir     Circuit model");
    println!("  ddgrover-synth  Gate sequences and variant assembly");
    println!("  ddgrover-hal    Execution adapter contract");
    println!("  ddgrover-exp    Stage runner and experiment engine");
    println!("  ddgrover-cli    Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
