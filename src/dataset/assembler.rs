//! Cross-referencing scenarios, boards and solver artifacts into rows.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::files::{read_json, scan_folder, Matched};
use super::row::DatasetRow;
use crate::board::{Board, BoardCatalog};
use crate::error::{Error, ParseError, Result};
use crate::pot::PotAccountant;
use crate::scenario::{folder_to_line, Scenario, ScenarioResolver, ScenarioTable};
use crate::strategy::{parse_entries, HandFrequency, StrategyEntry, StrategyReducer};
use crate::tree::{ActionNode, ActionTreeParser, ActionsArtifact};

/// A parsed decision point: the node and every holding's strategy at it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPoint {
    pub index: u32,
    pub node: ActionNode,
    pub entries: Vec<StrategyEntry>,
}

/// A unit or decision point that could not be turned into rows.
#[derive(Debug)]
pub struct UnitFailure {
    pub scenario: String,
    pub board: Option<String>,
    pub index: Option<u32>,
    pub error: Error,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scenario {}", self.scenario)?;
        if let Some(board) = &self.board {
            write!(f, ", board {}", board)?;
        }
        if let Some(index) = self.index {
            write!(f, ", index {}", index)?;
        }
        write!(f, ": {}", self.error)
    }
}

/// Output of an assembly run.
#[derive(Debug, Default)]
pub struct AssemblyReport {
    pub rows: Vec<DatasetRow>,
    pub failures: Vec<UnitFailure>,
    /// Decision points whose index exists in only one artifact family.
    pub unmatched: usize,
    /// Decision points turned into rows (possibly zero rows each).
    pub points: usize,
}

impl AssemblyReport {
    fn fail(&mut self, failure: UnitFailure) {
        log::warn!("{}", failure);
        self.failures.push(failure);
    }

    fn merge(&mut self, other: AssemblyReport) {
        self.rows.extend(other.rows);
        self.failures.extend(other.failures);
        self.unmatched += other.unmatched;
        self.points += other.points;
    }
}

/// Builds dataset rows.
#[derive(Debug, Clone)]
pub struct DatasetAssembler<'a> {
    scenarios: &'a ScenarioTable,
    boards: &'a BoardCatalog,
    accountant: PotAccountant,
    reducer: StrategyReducer,
    parser: ActionTreeParser,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(
        scenarios: &'a ScenarioTable,
        boards: &'a BoardCatalog,
        accountant: PotAccountant,
        reducer: StrategyReducer,
    ) -> Self {
        Self {
            scenarios,
            boards,
            accountant,
            reducer,
            parser: ActionTreeParser::new(),
        }
    }

    /// Rows for one decision point.
    ///
    /// Every frequency vector must line up with the node's moves; holdings
    /// without a dominant move produce no row.
    pub fn rows_for_point(
        &self,
        scenario: &Scenario,
        board: &Board,
        node: &ActionNode,
        entries: &[StrategyEntry],
    ) -> std::result::Result<Vec<DatasetRow>, ParseError> {
        let expected = node.available_moves.len();
        if let Some(bad) = entries.iter().find(|e| e.frequencies.len() != expected) {
            return Err(ParseError::FrequencyMismatch {
                hand: bad.holding.clone(),
                expected,
                got: bad.frequencies.len(),
            });
        }

        let pot_size = scenario.pot + node.postflop_pot(&self.accountant).trunc() as i64;
        let postflop_action = node.render_history();
        let flop = board.flop_csv();
        let turn = board.turn.to_string();
        let turn_type = board.turn_texture.clone().unwrap_or_default();

        Ok(self
            .reducer
            .reduce(entries)
            .into_iter()
            .map(|decision| DatasetRow {
                preflop_action: scenario.line.clone(),
                board_flop: flop.clone(),
                board_turn: turn.clone(),
                flop_type: board.texture.clone(),
                turn_type: turn_type.clone(),
                postflop_action: postflop_action.clone(),
                aggressor_position: scenario.aggressor,
                evaluation_at: node.street,
                pot_size,
                pot_type: scenario.pot_type,
                hero_position: node.hero,
                holding: decision.holding,
                available_moves: node.available_moves.clone(),
                correct_decision: node.available_moves[decision.index],
            })
            .collect())
    }

    /// Rows for every decision point of one (scenario, board) unit.
    ///
    /// A failing point is reported and skipped; the others still produce
    /// rows. Points are processed in parallel but rows keep point order.
    pub fn assemble_unit(&self, scenario: &Scenario, board: &Board, points: &[DecisionPoint]) -> AssemblyReport {
        let results: Vec<_> = points
            .par_iter()
            .map(|p| (p.index, self.rows_for_point(scenario, board, &p.node, &p.entries)))
            .collect();

        let mut report = AssemblyReport::default();
        for (index, result) in results {
            match result {
                Ok(rows) => {
                    report.points += 1;
                    report.rows.extend(rows);
                }
                Err(e) => report.fail(UnitFailure {
                    scenario: scenario.line.clone(),
                    board: Some(board.folder_name()),
                    index: Some(index),
                    error: e.into(),
                }),
            }
        }
        report
    }

    /// Parse one actions/strategy file pair.
    pub fn load_point(&self, pair: &Matched<PathBuf, PathBuf>) -> Result<DecisionPoint> {
        let actions: ActionsArtifact = read_json(&pair.actions)?;
        let strategy: Vec<HandFrequency> = read_json(&pair.strategy)?;
        Ok(DecisionPoint {
            index: pair.index,
            node: self.parser.parse(&actions)?,
            entries: parse_entries(&strategy)?,
        })
    }

    /// Rows for one solved board folder.
    pub fn assemble_board_folder(&self, scenario: &Scenario, board: &Board, dir: &Path) -> AssemblyReport {
        let mut report = AssemblyReport::default();
        let scan = match scan_folder(dir) {
            Ok(scan) => scan,
            Err(e) => {
                report.fail(UnitFailure {
                    scenario: scenario.line.clone(),
                    board: Some(board.folder_name()),
                    index: None,
                    error: e,
                });
                return report;
            }
        };
        report.unmatched = scan.gaps.len();

        let loaded: Vec<_> = scan
            .pairs
            .par_iter()
            .map(|pair| (pair.index, self.load_point(pair)))
            .collect();

        let mut points = Vec::with_capacity(loaded.len());
        for (index, result) in loaded {
            match result {
                Ok(point) => points.push(point),
                Err(error) => report.fail(UnitFailure {
                    scenario: scenario.line.clone(),
                    board: Some(board.folder_name()),
                    index: Some(index),
                    error,
                }),
            }
        }

        report.merge(self.assemble_unit(scenario, board, &points));
        report
    }

    /// Rows for a whole results tree laid out as
    /// `<root>/<scenario folder>/<board folder>/{actions,strategy}_<n>.json`.
    ///
    /// Folders are visited in name order so output is reproducible.
    pub fn assemble_results(&self, root: &Path) -> Result<AssemblyReport> {
        let resolver = ScenarioResolver::new(self.scenarios, self.accountant);
        let mut report = AssemblyReport::default();

        for scenario_dir in sorted_subdirs(root)? {
            let folder = dir_name(&scenario_dir);
            let line = folder_to_line(&folder);
            let scenario = match resolver.resolve(&line) {
                Ok(scenario) => scenario,
                Err(error) => {
                    report.fail(UnitFailure {
                        scenario: line,
                        board: None,
                        index: None,
                        error,
                    });
                    continue;
                }
            };

            let board_dirs = match sorted_subdirs(&scenario_dir) {
                Ok(dirs) => dirs,
                Err(error) => {
                    report.fail(UnitFailure {
                        scenario: line,
                        board: None,
                        index: None,
                        error,
                    });
                    continue;
                }
            };

            for board_dir in board_dirs {
                let board_name = dir_name(&board_dir);
                match self.boards.by_folder_name(&board_name) {
                    Ok(board) => {
                        log::info!("assembling {} on {}", line, board_name);
                        report.merge(self.assemble_board_folder(&scenario, board, &board_dir));
                    }
                    Err(error) => report.fail(UnitFailure {
                        scenario: line.clone(),
                        board: Some(board_name),
                        index: None,
                        error,
                    }),
                }
            }
        }

        Ok(report)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(format!("read {}", dir.display()), e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(format!("read {}", dir.display()), e))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Side;
    use crate::board::Card;
    use crate::scenario::{PotType, ScenarioRecord};
    use crate::tree::{Move, Street};

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn board() -> Board {
        Board::new([card("9c"), card("6d"), card("5d")], card("Ts"), card("2h"), "dynamic")
            .with_turn_texture("Dry")
    }

    fn scenario() -> Scenario {
        Scenario {
            line: "UTG/2.0bb/CO/call".into(),
            aggressor: Side::OOP,
            pot_type: PotType::SingleRaised,
            pot: 5,
            effective_stack: 98,
        }
    }

    fn node() -> ActionNode {
        ActionTreeParser::new()
            .parse_parts(
                &["Bet(2)", "Raise(7)", "Call", "Ts", "Check", "Bet(14)"],
                &["Call", "Raise(93)", "Fold"],
            )
            .unwrap()
    }

    fn tables() -> (ScenarioTable, BoardCatalog) {
        let scenarios = ScenarioTable::new(vec![ScenarioRecord {
            line: "UTG/2.0bb/CO/call".into(),
            aggressor: "OOP".into(),
            oop_range: None,
            ip_range: None,
        }]);
        (scenarios, BoardCatalog::from_boards(vec![board()]))
    }

    #[test]
    fn test_rows_for_point() {
        let (scenarios, boards) = tables();
        let assembler = DatasetAssembler::new(&scenarios, &boards, PotAccountant::default(), StrategyReducer::default());
        let entries = vec![
            StrategyEntry::new("TsTh", vec![0.8, 0.2, 0.0]),
            StrategyEntry::new("7h2c", vec![0.4, 0.2, 0.4]),
            StrategyEntry::new("Jc3c", vec![0.1, 0.0, 0.9]),
        ];

        let rows = assembler.rows_for_point(&scenario(), &board(), &node(), &entries).unwrap();
        assert_eq!(rows.len(), 2);

        let row = &rows[0];
        assert_eq!(row.preflop_action, "UTG/2.0bb/CO/call");
        assert_eq!(row.board_flop, "9c,6d,5d");
        assert_eq!(row.board_turn, "Ts");
        assert_eq!(row.flop_type, "dynamic");
        assert_eq!(row.turn_type, "Dry");
        assert_eq!(row.postflop_action, "OOP_BET_2/IP_RAISE_7/OOP_CALL/dealcards/Ts/OOP_CHECK/IP_BET_14");
        assert_eq!(row.evaluation_at, Street::Turn);
        assert_eq!(row.hero_position, Side::OOP);
        // 5 preflop + 14 flop + 14 turn
        assert_eq!(row.pot_size, 33);
        assert_eq!(row.correct_decision, Move::Call);
        assert_eq!(rows[1].holding, "Jc3c");
        assert_eq!(rows[1].correct_decision, Move::Fold);
    }

    #[test]
    fn test_frequency_length_mismatch() {
        let (scenarios, boards) = tables();
        let assembler = DatasetAssembler::new(&scenarios, &boards, PotAccountant::default(), StrategyReducer::default());
        let entries = vec![StrategyEntry::new("TsTh", vec![0.8, 0.2])];
        assert_eq!(
            assembler.rows_for_point(&scenario(), &board(), &node(), &entries),
            Err(ParseError::FrequencyMismatch { hand: "TsTh".into(), expected: 3, got: 2 })
        );
    }

    #[test]
    fn test_failing_point_does_not_block_unit() {
        let (scenarios, boards) = tables();
        let assembler = DatasetAssembler::new(&scenarios, &boards, PotAccountant::default(), StrategyReducer::default());
        let points = vec![
            DecisionPoint { index: 4, node: node(), entries: vec![StrategyEntry::new("AsKs", vec![0.1])] },
            DecisionPoint { index: 9, node: node(), entries: vec![StrategyEntry::new("AsKs", vec![0.1, 0.7, 0.2])] },
        ];

        let report = assembler.assemble_unit(&scenario(), &board(), &points);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].correct_decision, Move::Raise(93));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, Some(4));
        assert_eq!(report.points, 1);
    }
}
