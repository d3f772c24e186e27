//! Dataset rows and CSV output.

use std::fs::File;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::action::Side;
use crate::error::{Error, Result};
use crate::scenario::PotType;
use crate::tree::{Move, Street};

/// Column order of the output table.
pub const COLUMNS: [&str; 14] = [
    "preflop_action",
    "board_flop",
    "board_turn",
    "flop_type",
    "turn_type",
    "postflop_action",
    "aggressor_position",
    "evaluation_at",
    "pot_size",
    "pot_type",
    "hero_position",
    "holding",
    "available_moves",
    "correct_decision",
];

/// One labeled decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    pub preflop_action: String,
    /// Comma-joined flop cards.
    pub board_flop: String,
    pub board_turn: String,
    pub flop_type: String,
    pub turn_type: String,
    pub postflop_action: String,
    pub aggressor_position: Side,
    pub evaluation_at: Street,
    /// Preflop plus postflop pot, whole big blinds.
    pub pot_size: i64,
    pub pot_type: PotType,
    pub hero_position: Side,
    pub holding: String,
    /// Written as a JSON array of normalized labels.
    #[serde(serialize_with = "moves_as_json")]
    pub available_moves: Vec<Move>,
    pub correct_decision: Move,
}

fn moves_as_json<S: Serializer>(moves: &[Move], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let labels: Vec<String> = moves.iter().map(Move::to_string).collect();
    let json = serde_json::to_string(&labels).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&json)
}

/// Streams rows into a CSV file.
pub struct DatasetWriter {
    writer: csv::Writer<File>,
    written: usize,
}

impl DatasetWriter {
    /// Create (or truncate) the output file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("create {}", parent.display()), e))?;
        }
        let file = File::create(path).map_err(|e| Error::io(format!("create {}", path.display()), e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        // Header goes out even when no row is written.
        writer.write_record(COLUMNS)?;
        Ok(Self { writer, written: 0 })
    }

    pub fn write(&mut self, row: &DatasetRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<'a>(&mut self, rows: impl IntoIterator<Item = &'a DatasetRow>) -> Result<()> {
        rows.into_iter().try_for_each(|row| self.write(row))
    }

    /// Flush and return the number of rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer
            .flush()
            .map_err(|e| Error::io("flush dataset", e))?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DatasetRow {
        DatasetRow {
            preflop_action: "UTG/2.0bb/CO/call".into(),
            board_flop: "9c,6d,5d".into(),
            board_turn: "Ts".into(),
            flop_type: "dynamic".into(),
            turn_type: "Dry".into(),
            postflop_action: "OOP_BET_2/IP_RAISE_7/OOP_CALL/dealcards/Ts/OOP_CHECK/IP_BET_14".into(),
            aggressor_position: Side::OOP,
            evaluation_at: Street::Turn,
            pot_size: 33,
            pot_type: PotType::SingleRaised,
            hero_position: Side::OOP,
            holding: "TsTh".into(),
            available_moves: vec![Move::Call, Move::Raise(93), Move::Fold],
            correct_decision: Move::Call,
        }
    }

    #[test]
    fn test_row_serializes_with_serde() {
        let json = serde_json::to_value(row()).unwrap();
        assert_eq!(json["evaluation_at"], "Turn");
        assert_eq!(json["pot_type"], "Single-Raised");
        assert_eq!(json["available_moves"], r#"["Call","Raise 93","Fold"]"#);
        assert_eq!(json["correct_decision"], "Call");
    }

    #[test]
    fn test_writer_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out").join("dataset.csv");

        let mut writer = DatasetWriter::create(&path).unwrap();
        writer.write_all(&[row(), row()]).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS.to_vec());
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), COLUMNS.len());
        assert_eq!(&records[0][1], "9c,6d,5d");
        assert_eq!(&records[0][6], "OOP");
        assert_eq!(&records[0][7], "Turn");
        assert_eq!(&records[0][8], "33");
        assert_eq!(&records[0][9], "Single-Raised");
        assert_eq!(&records[0][12], r#"["Call","Raise 93","Fold"]"#);
        assert_eq!(&records[0][13], "Call");
    }
}
