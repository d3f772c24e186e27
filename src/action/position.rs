//! Seats that can appear as actors in an action stream.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A seat vocabulary for one kind of action stream.
///
/// Preflop lines are written with table positions, postflop histories with
/// the heads-up sides. Both share the pot accounting rules; only the seat set
/// and the forced blinds differ.
pub trait Seat: 'static + Copy + Eq + Hash + fmt::Debug + fmt::Display {
    /// Every seat in a fixed order, used for deterministic iteration.
    const ALL: &'static [Self];

    /// Parse a token as a seat identifier.
    fn parse(token: &str) -> Option<Self>;

    /// Chips posted before any action.
    fn blind(&self) -> f64 {
        0.0
    }
}

/// Table position in a 6-max game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Position {
    UTG = 0,
    HJ = 1,
    CO = 2,
    BTN = 3,
    SB = 4,
    BB = 5,
}

impl Position {
    /// Get position name.
    pub fn name(&self) -> &'static str {
        match self {
            Position::UTG => "UTG",
            Position::HJ => "HJ",
            Position::CO => "CO",
            Position::BTN => "BTN",
            Position::SB => "SB",
            Position::BB => "BB",
        }
    }

    /// Order of action after the flop: blinds first, button last.
    pub fn postflop_order(&self) -> usize {
        match self {
            Position::SB => 0,
            Position::BB => 1,
            Position::UTG => 2,
            Position::HJ => 3,
            Position::CO => 4,
            Position::BTN => 5,
        }
    }

    /// Check if this position is in position vs another (postflop).
    pub fn is_ip_vs(&self, other: &Position) -> bool {
        self.postflop_order() > other.postflop_order()
    }

    /// Side this position plays against `other` after the flop.
    pub fn side_vs(&self, other: &Position) -> Side {
        if self.is_ip_vs(other) {
            Side::IP
        } else {
            Side::OOP
        }
    }
}

impl Seat for Position {
    const ALL: &'static [Position] = &[
        Position::UTG,
        Position::HJ,
        Position::CO,
        Position::BTN,
        Position::SB,
        Position::BB,
    ];

    fn parse(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == token)
    }

    fn blind(&self) -> f64 {
        match self {
            Position::SB => 0.5,
            Position::BB => 1.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Heads-up postflop side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Out of position, first to act on every street.
    OOP,
    /// In position.
    IP,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::OOP => "OOP",
            Side::IP => "IP",
        }
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::OOP => Side::IP,
            Side::IP => Side::OOP,
        }
    }
}

impl Seat for Side {
    const ALL: &'static [Side] = &[Side::OOP, Side::IP];

    fn parse(token: &str) -> Option<Self> {
        match token {
            "OOP" => Some(Side::OOP),
            "IP" => Some(Side::IP),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!(Position::parse("UTG"), Some(Position::UTG));
        assert_eq!(Position::parse("BTN"), Some(Position::BTN));
        assert_eq!(Position::parse("BB"), Some(Position::BB));
        assert_eq!(Position::parse("bb"), None);
        assert_eq!(Position::parse("2.0bb"), None);
        assert_eq!(Position::parse("OOP"), None);
    }

    #[test]
    fn test_blinds() {
        assert_eq!(Position::SB.blind(), 0.5);
        assert_eq!(Position::BB.blind(), 1.0);
        assert_eq!(Position::CO.blind(), 0.0);
        assert_eq!(Side::OOP.blind(), 0.0);
    }

    #[test]
    fn test_postflop_sides() {
        assert_eq!(Position::UTG.side_vs(&Position::CO), Side::OOP);
        assert_eq!(Position::CO.side_vs(&Position::UTG), Side::IP);
        assert_eq!(Position::BB.side_vs(&Position::HJ), Side::OOP);
        assert_eq!(Position::BTN.side_vs(&Position::SB), Side::IP);
        assert_eq!(Position::SB.side_vs(&Position::BB), Side::OOP);
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!(Side::parse("OOP"), Some(Side::OOP));
        assert_eq!(Side::parse("IP"), Some(Side::IP));
        assert_eq!(Side::parse("UTG"), None);
        assert_eq!(Side::IP.opponent(), Side::OOP);
    }
}
