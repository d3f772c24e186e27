//! Loading the reference tables.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::board::{BetSizePolicy, BoardCatalog, BoardSample};
use crate::config::InputPaths;
use crate::error::{Error, Result};
use crate::scenario::{PreflopRanges, ScenarioRecord, ScenarioTable};

/// Read every row of a CSV table with headers.
pub fn read_csv<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    reader
        .deserialize()
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Read a JSON document.
pub fn read_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(format!("read {}", path.display()), e))?;
    Ok(serde_json::from_str(&text)?)
}

/// All reference tables of one run.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub scenarios: ScenarioTable,
    pub boards: BoardCatalog,
    pub ranges: PreflopRanges,
    pub bet_sizes: BetSizePolicy,
}

impl Inputs {
    /// Load the scenario list and board samples.
    ///
    /// Ranges and bet sizes are only needed to drive the solver, so they stay
    /// empty here; see [`Inputs::load_all`].
    pub fn load_tables(paths: &InputPaths) -> Result<Self> {
        let records: Vec<ScenarioRecord> = read_csv(&paths.scenario_list)?;
        let samples: Vec<BoardSample> = read_csv(&paths.board_samples)?;
        log::info!(
            "loaded {} scenarios and {} board samples",
            records.len(),
            samples.len()
        );
        Ok(Self {
            scenarios: ScenarioTable::new(records),
            boards: BoardCatalog::from_samples(&samples)?,
            ..Default::default()
        })
    }

    /// Load every table, including preflop ranges and the flop bet-size map.
    pub fn load_all(paths: &InputPaths) -> Result<Self> {
        let mut inputs = Self::load_tables(paths)?;
        inputs.ranges = read_json_file(&paths.preflop_ranges)?;
        inputs.bet_sizes = read_json_file(&paths.flop_size_map)?;
        Ok(inputs)
    }
}
