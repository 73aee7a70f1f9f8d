//! Run command implementation.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use ddgrover_exp::ExperimentEngine;

use super::common::{create_backend, format_stage, load_config, print_report};

/// Flags accepted by `ddgrover run`.
pub struct RunOptions<'a> {
    pub config: Option<&'a str>,
    pub shots: Option<u32>,
    pub backend: &'a str,
    pub seed: Option<u64>,
    pub noise: Option<f64>,
    pub export: Option<&'a str>,
    pub concurrent: bool,
}

/// Execute the run command.
pub async fn execute(opts: RunOptions<'_>) -> Result<()> {
    let mut config = load_config(opts.config)?;
    if let Some(shots) = opts.shots {
        config.shots = shots;
    }
    if opts.concurrent {
        config.concurrent_stages = true;
    }

    let backend = create_backend(opts.backend, opts.seed, opts.noise)?;
    println!(
        "{} Running {} stages on {} ({} shots per stage)",
        style("→").cyan().bold(),
        config.stages.len(),
        style(backend.name()).yellow(),
        config.shots
    );

    let width = config.qubit_count;
    let engine = ExperimentEngine::new(backend, config)?;

    let progress = ProgressBar::new(engine.total_runs() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .context("invalid progress template")?
            .progress_chars("=> "),
    );
    progress.set_message("running stages...");

    let observer = progress.clone();
    let engine = engine.with_observer(move |outcome| {
        observer.println(format_stage(outcome, width));
        observer.inc(1);
    });

    let report = engine.run().await?;
    progress.finish_and_clear();

    print_report(&report);

    if let Some(path) = opts.export {
        let json = report.to_json()?;
        std::fs::write(path, json).with_context(|| format!("Failed to write report: {path}"))?;
        println!("\n  Report written to {}", style(path).green());
    }

    Ok(())
}
