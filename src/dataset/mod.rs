//! Dataset assembly.
//!
//! ## Modules
//!
//! - `assembler`: joins scenarios, boards and decision points into rows
//! - `files`: discovery and matching of indexed solver artifacts
//! - `inputs`: loaders for the scenario list, board samples, ranges and bet sizes
//! - `row`: the output row and its CSV writer

pub mod assembler;
pub mod files;
pub mod inputs;
pub mod row;

pub use assembler::{AssemblyReport, DatasetAssembler, DecisionPoint, UnitFailure};
pub use files::{match_by_index, scan_folder, FolderScan, Matched};
pub use inputs::Inputs;
pub use row::{DatasetRow, DatasetWriter, COLUMNS};
