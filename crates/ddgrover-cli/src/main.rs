//! ddgrover Command-Line Interface
//!
//! Runs the standard vs. decoupled Grover comparison and inspects the
//! circuits it submits.
//!
//! ```text
//!   ddgrover run --shots 2000 --noise 0.01 --export report.json
//!   ddgrover circuit --target 0b10 --hardened
//!   ddgrover backends
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, circuit, run, version};

/// ddgrover - standard vs. dynamically decoupled Grover search benchmarks
#[derive(Parser)]
#[command(name = "ddgrover")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the multi-stage comparison
    Run {
        /// Experiment configuration (YAML or JSON)
        #[arg(short, long, env = "DDGROVER_CONFIG")]
        config: Option<String>,

        /// Shots per stage, overriding the configuration
        #[arg(short, long)]
        shots: Option<u32>,

        /// Backend to use
        #[arg(short, long, default_value = "sim")]
        backend: String,

        /// Sampler seed for the simulator
        #[arg(long)]
        seed: Option<u64>,

        /// Per-gate bit-flip probability for the simulator
        #[arg(long)]
        noise: Option<f64>,

        /// Write the JSON report to this file
        #[arg(short, long)]
        export: Option<String>,

        /// Submit all stages at once if the backend allows it
        #[arg(long)]
        concurrent: bool,
    },

    /// Print the circuit built for one target
    Circuit {
        /// Target as 0b-prefixed binary ("0b10") or decimal ("2")
        #[arg(short, long)]
        target: String,

        /// Register width
        #[arg(short, long, default_value = "2")]
        qubits: u32,

        /// Build the hardened variant
        #[arg(long)]
        hardened: bool,

        /// Insertion points for the hardened variant (pre_oracle, post_diffusion)
        #[arg(long, value_delimiter = ',')]
        insertion: Vec<String>,

        /// Oracle + diffusion rounds
        #[arg(long, default_value = "1")]
        iterations: u32,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            shots,
            backend,
            seed,
            noise,
            export,
            concurrent,
        } => {
            run::execute(run::RunOptions {
                config: config.as_deref(),
                shots,
                backend: &backend,
                seed,
                noise,
                export: export.as_deref(),
                concurrent,
            })
            .await
        }

        Commands::Circuit {
            target,
            qubits,
            hardened,
            insertion,
            iterations,
            format,
        } => circuit::execute(&target, qubits, hardened, &insertion, iterations, &format),

        Commands::Backends => backends::execute().await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
