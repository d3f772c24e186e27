//! Configuration for the dataset pipeline.
//!
//! Every field has a default, so a config file only needs to list what it
//! changes:
//!
//! ```json
//! {
//!   "stack_depth": 100.0,
//!   "confidence_threshold": 0.5,
//!   "solver": { "timeout_secs": 3600 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pot::{PotAccountant, DEFAULT_STACK_DEPTH};
use crate::strategy::{StrategyReducer, DEFAULT_THRESHOLD};

/// Configuration for a pipeline run.
///
/// # Example
/// ```
/// use solver_dataset::config::PipelineConfig;
///
/// let config = PipelineConfig::default().with_stack_depth(60.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stack depth in big blinds; an all-in commits exactly this much.
    pub stack_depth: f64,

    /// A holding is labeled only when one move's frequency strictly exceeds
    /// this value.
    pub confidence_threshold: f64,

    /// Combos played more often than this are kept in solver ranges.
    pub range_threshold: f64,

    /// Reference tables.
    pub inputs: InputPaths,

    /// Root of the solver output tree.
    pub results_dir: PathBuf,

    /// Dataset CSV written by `build_dataset`.
    pub output: PathBuf,

    /// First scenario (row index in the scenario list) to solve.
    pub scenario_start: usize,

    /// One past the last scenario to solve; `None` runs to the end.
    pub scenario_end: Option<usize>,

    /// External solver command.
    pub solver: SolverConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stack_depth: DEFAULT_STACK_DEPTH,
            confidence_threshold: DEFAULT_THRESHOLD,
            range_threshold: 0.5,
            inputs: InputPaths::default(),
            results_dir: PathBuf::from("results"),
            output: PathBuf::from("dataset.csv"),
            scenario_start: 0,
            scenario_end: None,
            solver: SolverConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Load from a JSON string and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder method: set the stack depth.
    pub fn with_stack_depth(mut self, stack_depth: f64) -> Self {
        self.stack_depth = stack_depth;
        self
    }

    /// Builder method: set the labeling threshold.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Builder method: set the results root.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Builder method: set the output CSV.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn accountant(&self) -> PotAccountant {
        PotAccountant::new(self.stack_depth)
    }

    pub fn reducer(&self) -> StrategyReducer {
        StrategyReducer::new(self.confidence_threshold)
    }

    /// Scenario rows selected by the start/end window, clamped to `len`.
    pub fn scenario_window(&self, len: usize) -> std::ops::Range<usize> {
        let end = self.scenario_end.unwrap_or(len).min(len);
        self.scenario_start.min(end)..end
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.stack_depth.is_finite() && self.stack_depth > 0.0) {
            return Err(ConfigError::InvalidStackDepth(self.stack_depth));
        }
        for (name, value) in [
            ("confidence", self.confidence_threshold),
            ("range", self.range_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold(name, value));
            }
        }
        if let Some(end) = self.scenario_end {
            if end < self.scenario_start {
                return Err(ConfigError::InvalidScenarioWindow {
                    start: self.scenario_start,
                    end,
                });
            }
        }
        if self.solver.program.trim().is_empty() {
            return Err(ConfigError::EmptySolverProgram);
        }
        Ok(())
    }
}

/// Locations of the reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    pub scenario_list: PathBuf,
    pub board_samples: PathBuf,
    pub preflop_ranges: PathBuf,
    pub flop_size_map: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

impl InputPaths {
    /// Standard file names under `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            scenario_list: dir.join("scenario_list.csv"),
            board_samples: dir.join("board_samples.csv"),
            preflop_ranges: dir.join("preflop_ranges.json"),
            flop_size_map: dir.join("flop_size_map.json"),
        }
    }
}

/// How to launch the external solver.
///
/// The solve arguments (`--flop`, `--turn`, ...) are appended after `args`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Kill a solve that runs longer than this.
    pub timeout_secs: Option<u64>,
    /// Append every solver stdout line here, under a header per unit.
    pub log_file: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: ["run", "--release", "--example", "solve", "--"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_secs: None,
            log_file: None,
        }
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("stack depth {0} must be positive")]
    InvalidStackDepth(f64),
    #[error("{0} threshold {1} is out of range [0, 1]")]
    InvalidThreshold(&'static str, f64),
    #[error("scenario window {start}..{end} is empty")]
    InvalidScenarioWindow { start: usize, end: usize },
    #[error("solver program is empty")]
    EmptySolverProgram,
}
