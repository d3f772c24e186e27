//! Postflop moves as reported by the solver.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::action::Descriptor;
use crate::error::ParseError;

/// A postflop betting action.
///
/// The solver writes moves in the form `Check`, `Bet(33)`, `Raise(93)`,
/// `AllIn(97)`. Amounts are the chips committed on the current street.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Fold,
    Check,
    Call,
    Bet(u32),
    Raise(u32),
    AllIn(u32),
}

impl Move {
    /// Check if this is a voluntary money-putting action.
    pub fn is_aggressive(&self) -> bool {
        matches!(self, Move::Bet(_) | Move::Raise(_) | Move::AllIn(_))
    }

    /// Get the bet/raise amount if applicable.
    pub fn amount(&self) -> Option<u32> {
        match self {
            Move::Bet(amt) | Move::Raise(amt) | Move::AllIn(amt) => Some(*amt),
            _ => None,
        }
    }

    /// Label used in rendered histories, e.g. `BET_14`.
    pub fn short_code(&self) -> String {
        match self {
            Move::Fold => "FOLD".to_string(),
            Move::Check => "CHECK".to_string(),
            Move::Call => "CALL".to_string(),
            Move::Bet(amt) => format!("BET_{}", amt),
            Move::Raise(amt) => format!("RAISE_{}", amt),
            Move::AllIn(amt) => format!("ALLIN_{}", amt),
        }
    }

    /// Same move in the pot accountant's vocabulary.
    pub fn descriptor(&self) -> Descriptor {
        match self {
            Move::Fold => Descriptor::Fold,
            Move::Check => Descriptor::Check,
            Move::Call => Descriptor::Call,
            Move::Bet(amt) | Move::Raise(amt) | Move::AllIn(amt) => Descriptor::Sized(*amt as f64),
        }
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseError::UnknownMove(s.to_string());
        match s {
            "Fold" => return Ok(Move::Fold),
            "Check" => return Ok(Move::Check),
            "Call" => return Ok(Move::Call),
            _ => {}
        }
        let (kind, rest) = s.split_once('(').ok_or_else(unknown)?;
        let amount: u32 = rest
            .strip_suffix(')')
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(unknown)?;
        match kind {
            "Bet" => Ok(Move::Bet(amount)),
            "Raise" => Ok(Move::Raise(amount)),
            "AllIn" => Ok(Move::AllIn(amount)),
            _ => Err(unknown()),
        }
    }
}

/// Normalized form: sizes are split from the action kind (`Bet 33`).
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Fold => write!(f, "Fold"),
            Move::Check => write!(f, "Check"),
            Move::Call => write!(f, "Call"),
            Move::Bet(amt) => write!(f, "Bet {}", amt),
            Move::Raise(amt) => write!(f, "Raise {}", amt),
            Move::AllIn(amt) => write!(f, "AllIn {}", amt),
        }
    }
}

impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_parsing() {
        assert_eq!("Fold".parse::<Move>().unwrap(), Move::Fold);
        assert_eq!("Check".parse::<Move>().unwrap(), Move::Check);
        assert_eq!("Call".parse::<Move>().unwrap(), Move::Call);
        assert_eq!("Bet(33)".parse::<Move>().unwrap(), Move::Bet(33));
        assert_eq!("Raise(93)".parse::<Move>().unwrap(), Move::Raise(93));
        assert_eq!("AllIn(97)".parse::<Move>().unwrap(), Move::AllIn(97));
    }

    #[test]
    fn test_unknown_moves() {
        for bad in ["None", "Chance(3)", "Bet(x)", "Bet(3", "bet(3)", ""] {
            assert_eq!(bad.parse::<Move>(), Err(ParseError::UnknownMove(bad.to_string())));
        }
    }

    #[test]
    fn test_normalized_labels() {
        assert_eq!(Move::Bet(33).to_string(), "Bet 33");
        assert_eq!(Move::Raise(93).to_string(), "Raise 93");
        assert_eq!(Move::AllIn(97).to_string(), "AllIn 97");
        assert_eq!(Move::Check.to_string(), "Check");
        assert_eq!(Move::Raise(7).short_code(), "RAISE_7");
    }

    #[test]
    fn test_move_properties() {
        assert!(Move::Bet(2).is_aggressive());
        assert!(Move::AllIn(97).is_aggressive());
        assert!(!Move::Call.is_aggressive());
        assert_eq!(Move::Raise(7).amount(), Some(7));
        assert_eq!(Move::Check.amount(), None);
        assert_eq!(Move::Bet(2).descriptor(), Descriptor::Sized(2.0));
    }
}
