//! Postflop decision points from the solver's action artifacts.
//!
//! Each `actions_<n>.json` written by the solver describes one node of the
//! postflop tree:
//!
//! ```text
//! {
//!   "flop": "9c6d5d",
//!   "action": ["Fold", "Call", "Raise(93)"],
//!   "prev_action_line": [1, 2, 1, 38, 0, 1],
//!   "parsed_prev_action_line": ["Bet(2)", "Raise(7)", "Call", "Ts", "Check", "Bet(14)"]
//! }
//! ```
//!
//! `action` lists the moves available at the node; the parsed history mixes
//! moves with deal-card markers (the turn and river cards).

mod moves;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{ActionLine, Side, Step};
use crate::board::Card;
use crate::error::ParseError;
use crate::pot::PotAccountant;

pub use moves::Move;

/// Marker written before a dealt card in rendered histories.
pub const DEAL_MARKER: &str = "dealcards";

/// Postflop street a decision is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Street {
    Flop,
    Turn,
    River,
}

impl Street {
    /// Street reached after `deals` cards were dealt past the flop.
    pub fn from_deal_count(deals: usize) -> Result<Self, ParseError> {
        match deals {
            0 => Ok(Street::Flop),
            1 => Ok(Street::Turn),
            2 => Ok(Street::River),
            n => Err(ParseError::TooManyDeals(n)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Street::Flop => "Flop",
            Street::Turn => "Turn",
            Street::River => "River",
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw actions artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsArtifact {
    #[serde(default)]
    pub flop: String,
    /// Moves available at the node, solver notation.
    pub action: Vec<String>,
    #[serde(default)]
    pub prev_action_line: Vec<usize>,
    /// History leading to the node, solver notation plus dealt cards.
    pub parsed_prev_action_line: Vec<String>,
}

/// One entry of a postflop history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Move { actor: Side, action: Move },
    Deal(Card),
}

/// A postflop decision point.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionNode {
    pub history: Vec<HistoryEvent>,
    pub street: Street,
    /// Side to act at this node.
    pub hero: Side,
    pub available_moves: Vec<Move>,
}

impl ActionNode {
    /// Render the history as `OOP_BET_2/IP_CALL/dealcards/Ts/OOP_CHECK`.
    pub fn render_history(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.history.len() + 2);
        for event in &self.history {
            match event {
                HistoryEvent::Move { actor, action } => {
                    parts.push(format!("{}_{}", actor, action.short_code()))
                }
                HistoryEvent::Deal(card) => {
                    parts.push(DEAL_MARKER.to_string());
                    parts.push(card.to_string());
                }
            }
        }
        parts.join("/")
    }

    /// Normalized move labels (`Bet 33`, `Call`, ...).
    pub fn move_labels(&self) -> Vec<String> {
        self.available_moves.iter().map(Move::to_string).collect()
    }

    /// The history split into one `OOP`/`IP` line per street.
    pub fn rounds(&self) -> Vec<ActionLine<Side>> {
        let mut rounds = Vec::new();
        let mut steps = Vec::new();
        for event in &self.history {
            match event {
                HistoryEvent::Move { actor, action } => steps.push(Step {
                    actor: *actor,
                    action: action.descriptor(),
                }),
                HistoryEvent::Deal(_) => rounds.push(ActionLine::from_steps(std::mem::take(&mut steps))),
            }
        }
        rounds.push(ActionLine::from_steps(steps));
        rounds
    }

    /// Chips put in after the flop, across all streets.
    pub fn postflop_pot(&self, accountant: &PotAccountant) -> f64 {
        accountant.rounds(&self.rounds())
    }
}

/// Parses solver action artifacts into [`ActionNode`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionTreeParser;

impl ActionTreeParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, artifact: &ActionsArtifact) -> Result<ActionNode, ParseError> {
        self.parse_parts(&artifact.parsed_prev_action_line, &artifact.action)
    }

    /// Parse a history and the moves available after it.
    ///
    /// OOP acts first on every street, so actors alternate starting from OOP
    /// after each dealt card.
    pub fn parse_parts<H, A>(&self, history: &[H], available: &[A]) -> Result<ActionNode, ParseError>
    where
        H: AsRef<str>,
        A: AsRef<str>,
    {
        let mut events = Vec::with_capacity(history.len());
        let mut deals = 0;
        let mut to_act = Side::OOP;

        for token in history.iter().map(AsRef::as_ref) {
            if let Some(card) = Card::parse(token) {
                deals += 1;
                to_act = Side::OOP;
                events.push(HistoryEvent::Deal(card));
            } else {
                let action: Move = token.parse()?;
                events.push(HistoryEvent::Move { actor: to_act, action });
                to_act = to_act.opponent();
            }
        }

        let available_moves = available
            .iter()
            .map(|m| m.as_ref().parse::<Move>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ActionNode {
            history: events,
            street: Street::from_deal_count(deals)?,
            hero: to_act,
            available_moves,
        })
    }
}
