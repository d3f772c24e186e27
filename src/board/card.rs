//! Card representation.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Rank characters for display, 2 through A.
const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

/// Suit characters for display.
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// A single playing card.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    /// Card index 0-51: rank * 4 + suit
    id: u8,
}

impl Card {
    /// Create a new card from rank (0-12) and suit (0-3).
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13, "rank must be 0-12");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self { id: rank * 4 + suit }
    }

    /// Parse a card from a string like "As", "Kh", "2c".
    ///
    /// Only the canonical form (upper-case rank, lower-case suit) is
    /// accepted, which keeps action words like `Bet` or `IP` from ever
    /// reading as a card.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let (r, su) = (chars.next()?, chars.next()?);
        if chars.next().is_some() {
            return None;
        }
        let rank = RANK_CHARS.iter().position(|&c| c == r)?;
        let suit = SUIT_CHARS.iter().position(|&c| c == su)?;
        Some(Self::new(rank as u8, suit as u8))
    }

    /// Whether a token has the shape of a single card.
    pub fn is_card(token: &str) -> bool {
        Self::parse(token).is_some()
    }

    #[inline]
    pub fn rank(&self) -> u8 {
        self.id / 4
    }

    #[inline]
    pub fn suit(&self) -> u8 {
        self.id % 4
    }
}

impl FromStr for Card {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseError::InvalidCard(s.to_string()))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANK_CHARS[self.rank() as usize],
            SUIT_CHARS[self.suit() as usize]
        )
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Parse a run of concatenated cards such as `9c6d5d`.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, ParseError> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return Err(ParseError::InvalidCard(s.to_string()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s[i..i + 2].parse())
        .collect()
}
