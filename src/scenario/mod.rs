//! Preflop scenarios.
//!
//! A scenario is a preflop line such as `UTG/2.0bb/CO/call` together with
//! the metadata the dataset needs: who was the aggressor, what kind of pot it
//! is, and how big the pot and remaining stacks are when the flop is dealt.

mod ranges;

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::action::{ActionLine, Position, Seat, Side};
use crate::error::{Error, ParseError, Result};
use crate::pot::PotAccountant;

pub use ranges::{PreflopRanges, RangeSpec};

/// Kind of pot, from the number of raises in the preflop line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotType {
    #[serde(rename = "Single-Raised")]
    SingleRaised,
    #[serde(rename = "3-Bet")]
    ThreeBet,
}

impl PotType {
    /// Classify by the number of `<n>bb` tokens: exactly one is a
    /// single-raised pot, anything else (re-raises, or shove-only lines with
    /// none) is a 3-bet pot.
    pub fn from_sized_bets(count: usize) -> Self {
        if count == 1 {
            PotType::SingleRaised
        } else {
            PotType::ThreeBet
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PotType::SingleRaised => "Single-Raised",
            PotType::ThreeBet => "3-Bet",
        }
    }
}

impl fmt::Display for PotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One row of the scenario list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    #[serde(rename = "Scenario")]
    pub line: String,
    /// `OOP`/`IP`, or the table position of the raiser.
    #[serde(rename = "Aggressor")]
    pub aggressor: String,
    /// Preflop range label of the out-of-position player.
    #[serde(rename = "OOP", default)]
    pub oop_range: Option<String>,
    /// Preflop range label of the in-position player.
    #[serde(rename = "IP", default)]
    pub ip_range: Option<String>,
}

/// Scenario list keyed by preflop line.
#[derive(Debug, Clone, Default)]
pub struct ScenarioTable {
    records: Vec<ScenarioRecord>,
    by_line: FxHashMap<String, usize>,
}

impl ScenarioTable {
    /// Later rows for the same line replace earlier ones.
    pub fn new(records: Vec<ScenarioRecord>) -> Self {
        let by_line = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.line.clone(), i))
            .collect();
        Self { records, by_line }
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, line: &str) -> Result<&ScenarioRecord> {
        self.by_line
            .get(line)
            .map(|&i| &self.records[i])
            .ok_or_else(|| Error::lookup("scenario list", line))
    }
}

/// A resolved preflop scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub line: String,
    pub aggressor: Side,
    pub pot_type: PotType,
    /// Preflop pot, whole big blinds.
    pub pot: i64,
    /// Stack behind at the flop, whole big blinds.
    pub effective_stack: i64,
}

impl Scenario {
    /// Name of the folder the scenario is solved into (`UTG_2.0bb_CO_call`).
    pub fn folder_name(&self) -> String {
        line_to_folder(&self.line)
    }
}

/// Encode a preflop line as a folder name.
pub fn line_to_folder(line: &str) -> String {
    line.replace('/', "_")
}

/// Decode a scenario folder name back into its preflop line.
pub fn folder_to_line(folder: &str) -> String {
    folder.replace('_', "/")
}

/// Resolves preflop lines against the scenario list.
#[derive(Debug, Clone)]
pub struct ScenarioResolver<'a> {
    table: &'a ScenarioTable,
    accountant: PotAccountant,
}

impl<'a> ScenarioResolver<'a> {
    pub fn new(table: &'a ScenarioTable, accountant: PotAccountant) -> Self {
        Self { table, accountant }
    }

    /// Resolve aggressor, pot type and preflop pot of a line.
    pub fn resolve(&self, line: &str) -> Result<Scenario> {
        let record = self.table.get(line)?;
        let actions = ActionLine::<Position>::parse(line)?;
        let pot_type = PotType::from_sized_bets(actions.sized_bet_count());
        let aggressor = resolve_aggressor(&record.aggressor, &actions)?;
        let summary = self.accountant.preflop(&actions);

        Ok(Scenario {
            line: line.to_string(),
            aggressor,
            pot_type,
            pot: summary.pot,
            effective_stack: summary.effective_stack,
        })
    }
}

/// Map an `Aggressor` cell to a postflop side.
///
/// A table position is compared with the other player still in the hand.
fn resolve_aggressor(cell: &str, actions: &ActionLine<Position>) -> Result<Side> {
    let cell = cell.trim();
    if let Some(side) = Side::parse(cell) {
        return Ok(side);
    }
    let position =
        Position::parse(cell).ok_or_else(|| ParseError::UnknownSeat(cell.to_string()))?;
    actions
        .live_seats()
        .into_iter()
        .find(|p| *p != position)
        .map(|opponent| position.side_vs(&opponent))
        .ok_or_else(|| ParseError::UnknownSeat(cell.to_string()).into())
}
