//! Board samples and texture-driven bet sizing.
//!
//! Boards come from the board samples table (`Texture`, `Flop`, `Turn`,
//! `River`, optionally `TurnTexture`). Each board is solved into its own
//! folder named `<flop>_<turn>_<river>`, e.g. `9c6d5d_Ts_2h`.

pub mod card;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ParseError, Result};
pub use card::{parse_cards, Card};

/// One row of the board samples table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSample {
    #[serde(rename = "Texture")]
    pub texture: String,
    /// Three cards, comma-joined (`9c,6d,5d`).
    #[serde(rename = "Flop")]
    pub flop: String,
    #[serde(rename = "Turn")]
    pub turn: String,
    #[serde(rename = "River")]
    pub river: String,
    #[serde(rename = "TurnTexture", default)]
    pub turn_texture: Option<String>,
}

/// A validated runout with its texture tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub flop: [Card; 3],
    pub turn: Card,
    pub river: Card,
    pub texture: String,
    pub turn_texture: Option<String>,
}

impl Board {
    pub fn new(flop: [Card; 3], turn: Card, river: Card, texture: impl Into<String>) -> Self {
        Self {
            flop,
            turn,
            river,
            texture: texture.into(),
            turn_texture: None,
        }
    }

    pub fn with_turn_texture(mut self, texture: impl Into<String>) -> Self {
        self.turn_texture = Some(texture.into());
        self
    }

    /// Flop cards concatenated, as the solver expects them (`9c6d5d`).
    pub fn flop_str(&self) -> String {
        self.flop.iter().map(Card::to_string).collect()
    }

    /// Flop cards comma-joined, as written in the dataset (`9c,6d,5d`).
    pub fn flop_csv(&self) -> String {
        self.flop
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Name of the folder this board is solved into.
    pub fn folder_name(&self) -> String {
        format!("{}_{}_{}", self.flop_str(), self.turn, self.river)
    }
}

impl TryFrom<&BoardSample> for Board {
    type Error = ParseError;

    fn try_from(sample: &BoardSample) -> std::result::Result<Self, ParseError> {
        let joined: String = sample.flop.split(',').map(str::trim).collect();
        let flop = parse_flop(&joined)?;
        Ok(Self {
            flop,
            turn: sample.turn.trim().parse()?,
            river: sample.river.trim().parse()?,
            texture: sample.texture.clone(),
            turn_texture: sample
                .turn_texture
                .as_ref()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        })
    }
}

fn parse_flop(s: &str) -> std::result::Result<[Card; 3], ParseError> {
    match parse_cards(s)?.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(ParseError::InvalidCard(s.to_string())),
    }
}

/// Cards of a board folder name, `9c6d5d_Ts_2h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardKey {
    pub flop: [Card; 3],
    pub turn: Card,
    pub river: Card,
}

impl BoardKey {
    pub fn from_folder_name(name: &str) -> std::result::Result<Self, ParseError> {
        let bad = || ParseError::FolderName(name.to_string());
        let mut parts = name.split('_');
        let (flop, turn, river) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(f), Some(t), Some(r), None) => (f, t, r),
            _ => return Err(bad()),
        };
        Ok(Self {
            flop: parse_flop(flop).map_err(|_| bad())?,
            turn: turn.parse().map_err(|_| bad())?,
            river: river.parse().map_err(|_| bad())?,
        })
    }
}

impl From<&Board> for BoardKey {
    fn from(board: &Board) -> Self {
        Self {
            flop: board.flop,
            turn: board.turn,
            river: board.river,
        }
    }
}

/// All sampled boards, addressable by their runout.
#[derive(Debug, Clone, Default)]
pub struct BoardCatalog {
    boards: Vec<Board>,
    index: FxHashMap<BoardKey, usize>,
}

impl BoardCatalog {
    /// Validate raw samples into a catalog.
    pub fn from_samples(samples: &[BoardSample]) -> Result<Self> {
        let boards = samples
            .iter()
            .map(Board::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::from_boards(boards))
    }

    pub fn from_boards(boards: Vec<Board>) -> Self {
        let index = boards
            .iter()
            .enumerate()
            .map(|(i, b)| (BoardKey::from(b), i))
            .collect();
        Self { boards, index }
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Board solved into the folder `name`.
    pub fn by_folder_name(&self, name: &str) -> Result<&Board> {
        let key = BoardKey::from_folder_name(name)?;
        self.index
            .get(&key)
            .map(|&i| &self.boards[i])
            .ok_or_else(|| Error::lookup("board samples", name))
    }
}

/// Flop bet sizing per board texture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetSizePolicy {
    sizes: FxHashMap<String, String>,
}

impl BetSizePolicy {
    pub fn new(sizes: FxHashMap<String, String>) -> Self {
        Self { sizes }
    }

    /// Bet-size specification for a texture (e.g. `"33%"`).
    pub fn size_for(&self, texture: &str) -> Result<&str> {
        self.sizes
            .get(texture)
            .map(String::as_str)
            .ok_or_else(|| Error::lookup("flop bet-size map", texture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BoardSample {
        BoardSample {
            texture: "dynamic".into(),
            flop: "9c,6d,5d".into(),
            turn: "Ts".into(),
            river: "2h".into(),
            turn_texture: Some("Dry".into()),
        }
    }

    #[test]
    fn test_board_from_sample() {
        let board = Board::try_from(&sample()).unwrap();
        assert_eq!(board.flop_str(), "9c6d5d");
        assert_eq!(board.flop_csv(), "9c,6d,5d");
        assert_eq!(board.folder_name(), "9c6d5d_Ts_2h");
        assert_eq!(board.turn_texture.as_deref(), Some("Dry"));
    }

    #[test]
    fn test_invalid_sample() {
        let mut bad = sample();
        bad.flop = "9c,6d".into();
        assert!(Board::try_from(&bad).is_err());
    }

    #[test]
    fn test_catalog_lookup_by_folder() {
        let catalog = BoardCatalog::from_samples(&[sample()]).unwrap();
        let board = catalog.by_folder_name("9c6d5d_Ts_2h").unwrap();
        assert_eq!(board.texture, "dynamic");
        assert!(matches!(
            catalog.by_folder_name("9c6d5d_Ts_3h"),
            Err(Error::Lookup { .. })
        ));
        assert!(matches!(
            catalog.by_folder_name("9c6d5d_Ts"),
            Err(Error::Parse(ParseError::FolderName(_)))
        ));
    }

    #[test]
    fn test_bet_size_policy() {
        let mut sizes = FxHashMap::default();
        sizes.insert("dynamic".to_string(), "33%".to_string());
        let policy = BetSizePolicy::new(sizes);
        assert_eq!(policy.size_for("dynamic").unwrap(), "33%");
        assert!(policy.size_for("static").is_err());
    }
}
