//! # Solver Dataset
//!
//! Turns the output of an external postflop poker solver into a flat,
//! labeled training dataset: one row per (preflop line, board, decision
//! point, holding), labeled with the move the solver plays most often.
//!
//! ## Features
//!
//! - **Action Interpreter**: Replays compact action lines (`UTG/2.0bb/CO/call`)
//!   into per-seat contributions, pot size and effective stack
//! - **Action Trees**: Classifies the street, the hero and the available moves
//!   of every solver decision point
//! - **Label Reduction**: Collapses frequency vectors into a single decision
//!   under a confidence threshold
//! - **Assembly**: Joins scenarios, boards and indexed artifact pairs into
//!   CSV rows
//! - **Solver Driver**: Runs the solver per (scenario, board) unit, forwarding
//!   its output to the logger
//!
//! ## Quick Start
//!
//! ```ignore
//! use solver_dataset::config::PipelineConfig;
//! use solver_dataset::dataset::{DatasetAssembler, DatasetWriter, Inputs};
//!
//! let config = PipelineConfig::from_json_file("pipeline.json")?;
//! let inputs = Inputs::load_tables(&config.inputs)?;
//! let assembler = DatasetAssembler::new(
//!     &inputs.scenarios,
//!     &inputs.boards,
//!     config.accountant(),
//!     config.reducer(),
//! );
//! let report = assembler.assemble_results(&config.results_dir)?;
//!
//! let mut writer = DatasetWriter::create(&config.output)?;
//! writer.write_all(&report.rows)?;
//! writer.finish()?;
//! ```
//!
//! ## Modules
//!
//! - [`action`]: Tokens, seats and action lines
//! - [`pot`]: Contribution replay and pot accounting
//! - [`scenario`]: Preflop scenarios and ranges
//! - [`board`]: Cards, board samples and bet sizing
//! - [`tree`]: Postflop decision points
//! - [`strategy`]: Frequency tables and label reduction
//! - [`dataset`]: Artifact discovery, assembly and CSV output
//! - [`solver`]: External solver invocation
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌───────────────────────────┐
//! │  scenario  │──▶│    pot     │◀──│          tree             │
//! │  resolver  │   │ accountant │   │  street / hero / moves    │
//! └────────────┘   └────────────┘   └───────────────────────────┘
//!       │                                        │
//!       │          ┌────────────┐                │
//!       │          │  strategy  │                │
//!       │          │  reducer   │                │
//!       │          └────────────┘                │
//!       ▼                 ▼                      ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 DatasetAssembler → CSV rows                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod board;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pot;
pub mod scenario;
pub mod solver;
pub mod strategy;
pub mod tree;

pub use action::{ActionLine, Position, Seat, Side};
pub use config::{ConfigError, PipelineConfig};
pub use dataset::{DatasetAssembler, DatasetRow, DatasetWriter};
pub use error::{Error, ParseError, Result};
pub use pot::{PotAccountant, PotSummary};
pub use scenario::{PotType, Scenario, ScenarioResolver};
pub use strategy::StrategyReducer;
pub use tree::{ActionNode, ActionTreeParser, Move, Street};
