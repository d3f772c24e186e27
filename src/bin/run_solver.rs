//! Batch Solve Driver
//!
//! Runs the external solver for every (scenario, board) unit of the
//! configured scenario window, writing artifacts under the results folder.
//!
//! Usage:
//!   run_solver --config pipeline.json [--start 0] [--end 10]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use solver_dataset::config::PipelineConfig;
use solver_dataset::dataset::Inputs;
use solver_dataset::solver::{plan_requests, SolverDriver};

#[derive(Parser)]
#[command(name = "run_solver")]
#[command(about = "Solve every (scenario, board) unit with the external solver")]
struct Args {
    /// JSON pipeline config; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// First scenario row to solve (overrides config)
    #[arg(long)]
    start: Option<usize>,
    /// One past the last scenario row to solve (overrides config)
    #[arg(long)]
    end: Option<usize>,
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
    if let Some(start) = args.start {
        config.scenario_start = start;
    }
    if args.end.is_some() {
        config.scenario_end = args.end;
    }
    config.validate()?;

    println!("=== Batch Solve ===\n");
    let start = Instant::now();

    let inputs = Inputs::load_all(&config.inputs)?;
    let window = config.scenario_window(inputs.scenarios.len());
    let (requests, skipped) = plan_requests(&config, &inputs);
    println!(
        "Scenarios {}..{} | {} boards | {} units planned, {} skipped\n",
        window.start,
        window.end,
        inputs.boards.len(),
        requests.len(),
        skipped.len()
    );

    let pb = ProgressBar::new(requests.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let driver = SolverDriver::new(config.solver.clone());
    let report = driver.run_batch(&requests, |request| {
        pb.set_message(request.unit_label());
        pb.inc(1);
    });
    pb.finish_and_clear();

    println!("Solved {} units in {:.1}s", report.solved, start.elapsed().as_secs_f64());
    if !report.failures.is_empty() {
        println!("\n{} units failed:", report.failures.len());
        for (unit, error) in &report.failures {
            println!("  {}: {}", unit, error);
        }
    }
    Ok(())
}
