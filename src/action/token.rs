//! Tokenizing and classifying delimited action strings.
//!
//! An action line is a `/`-delimited sequence such as `UTG/2.0bb/CO/call`.
//! Tokens alternate between an actor (a seat identifier) and the action that
//! actor took.

use std::fmt;

use super::position::Seat;
use crate::error::ParseError;

/// Field delimiter of action lines.
pub const DELIMITER: char = '/';

/// Unit suffix of explicit bet sizes.
pub const SIZE_UNIT: &str = "bb";

/// Split an action line into its non-empty tokens, in order.
///
/// Token content is not normalized.
pub fn tokenize(raw: &str) -> Vec<&str> {
    raw.split(DELIMITER).filter(|t| !t.is_empty()).collect()
}

/// What an actor did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Descriptor {
    Call,
    Fold,
    Check,
    /// Shove for the full stack depth.
    AllIn,
    /// Bet or raise to an explicit amount (in big blinds).
    Sized(f64),
}

impl Descriptor {
    /// Whether this action is an explicit `<n>bb` size. `allin` is not.
    pub fn is_sized(&self) -> bool {
        matches!(self, Descriptor::Sized(_))
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Call => write!(f, "call"),
            Descriptor::Fold => write!(f, "fold"),
            Descriptor::Check => write!(f, "check"),
            Descriptor::AllIn => write!(f, "allin"),
            Descriptor::Sized(amount) => write!(f, "{}{}", amount, SIZE_UNIT),
        }
    }
}

/// A classified token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionToken<S> {
    Seat(S),
    Action(Descriptor),
}

impl<S: Seat> ActionToken<S> {
    /// Classify one token against the seat vocabulary `S`.
    pub fn classify(token: &str) -> Result<Self, ParseError> {
        if let Some(seat) = S::parse(token) {
            return Ok(ActionToken::Seat(seat));
        }
        let descriptor = match token {
            "call" => Descriptor::Call,
            "fold" => Descriptor::Fold,
            "check" => Descriptor::Check,
            "allin" => Descriptor::AllIn,
            sized => Descriptor::Sized(parse_size(sized)?),
        };
        Ok(ActionToken::Action(descriptor))
    }
}

/// Parse a unit-suffixed amount such as `2.5bb`.
pub fn parse_size(token: &str) -> Result<f64, ParseError> {
    token
        .strip_suffix(SIZE_UNIT)
        .and_then(|num| num.parse::<f64>().ok())
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .ok_or_else(|| ParseError::InvalidBetSize(token.to_string()))
}

/// One (actor, action) pair of a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<S> {
    pub actor: S,
    pub action: Descriptor,
}

/// An action line grouped into (actor, action) pairs.
///
/// Grouping happens before any chip arithmetic: every action must be
/// immediately preceded by a seat token, and the token after an action is
/// reserved for the next actor. A seat followed by another seat only sets
/// context, so the later one is the actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLine<S> {
    steps: Vec<Step<S>>,
}

impl<S: Seat> ActionLine<S> {
    /// Tokenize and group a raw line.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        Self::from_tokens(&tokenize(raw))
    }

    /// Group already tokenized input.
    pub fn from_tokens(tokens: &[&str]) -> Result<Self, ParseError> {
        let mut steps: Vec<Step<S>> = Vec::with_capacity(tokens.len() / 2);
        let mut actor: Option<S> = None;

        for (index, token) in tokens.iter().enumerate() {
            match ActionToken::<S>::classify(token)? {
                ActionToken::Seat(seat) => actor = Some(seat),
                ActionToken::Action(action) => match actor.take() {
                    Some(actor) => steps.push(Step { actor, action }),
                    None => {
                        return Err(match steps.last() {
                            Some(prev) => ParseError::UnexpectedAction {
                                index,
                                actor: prev.actor.to_string(),
                                token: token.to_string(),
                            },
                            None => ParseError::MissingActor {
                                index,
                                token: token.to_string(),
                            },
                        })
                    }
                },
            }
        }

        Ok(Self { steps })
    }

    /// Build directly from pairs.
    pub fn from_steps(steps: Vec<Step<S>>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step<S>] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of explicit `<n>bb` wagers.
    pub fn sized_bet_count(&self) -> usize {
        self.steps.iter().filter(|s| s.action.is_sized()).count()
    }

    /// Seats that acted without folding, in order of first appearance.
    pub fn live_seats(&self) -> Vec<S> {
        let mut live: Vec<S> = Vec::new();
        for step in &self.steps {
            if step.action == Descriptor::Fold {
                live.retain(|s| *s != step.actor);
            } else if !live.contains(&step.actor) {
                live.push(step.actor);
            }
        }
        live
    }
}

impl<S: Seat> fmt::Display for ActionLine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DELIMITER)?;
            }
            write!(f, "{}{}{}", step.actor, DELIMITER, step.action)?;
        }
        Ok(())
    }
}
