//! Dataset Builder
//!
//! Walks the results tree written by `run_solver` and writes one CSV row per
//! labeled (scenario, board, decision point, holding).
//!
//! Usage:
//!   build_dataset --config pipeline.json [--output dataset.csv]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use solver_dataset::config::PipelineConfig;
use solver_dataset::dataset::{DatasetAssembler, DatasetWriter, Inputs};

#[derive(Parser)]
#[command(name = "build_dataset")]
#[command(about = "Assemble solver results into a labeled CSV dataset")]
struct Args {
    /// JSON pipeline config; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output CSV (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> solver_dataset::Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(output) = args.output {
        config = config.with_output(output);
    }

    println!("=== Dataset Builder ===\n");
    let start = Instant::now();

    let inputs = Inputs::load_tables(&config.inputs)?;
    let assembler = DatasetAssembler::new(
        &inputs.scenarios,
        &inputs.boards,
        config.accountant(),
        config.reducer(),
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("assembling {}", config.results_dir.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    let report = assembler.assemble_results(&config.results_dir)?;
    spinner.finish_and_clear();

    let mut writer = DatasetWriter::create(&config.output)?;
    writer.write_all(&report.rows)?;
    let written = writer.finish()?;

    println!("Decision points: {}", report.points);
    println!("Unmatched indices skipped: {}", report.unmatched);
    println!("Failures: {}", report.failures.len());
    println!(
        "Wrote {} rows to {} in {:.1}s",
        written,
        config.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
