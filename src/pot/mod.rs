//! Pot accounting for action lines.
//!
//! The accountant replays an [`ActionLine`] one step at a time. Each step
//! returns a fresh [`ContributionState`] so intermediate states can be
//! inspected; nothing is mutated outside the replay.
//!
//! Rules per action:
//!
//! ```text
//! call   -> contribution raised to current_bet
//! allin  -> contribution = stack depth, current_bet >= stack depth
//! fold   -> no change
//! check  -> no change
//! <n>bb  -> contribution = n, current_bet >= n
//! ```
//!
//! Totals are truncated to whole big blinds.

use rustc_hash::FxHashMap;

use crate::action::{ActionLine, Descriptor, Seat, Step};
use crate::error::ParseError;

/// Default stack depth in big blinds.
pub const DEFAULT_STACK_DEPTH: f64 = 100.0;

/// Chips committed by each seat during one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionState<S: Seat> {
    contributions: FxHashMap<S, f64>,
    current_bet: f64,
}

impl<S: Seat> ContributionState<S> {
    /// Empty state with no forced bets.
    pub fn empty() -> Self {
        Self {
            contributions: FxHashMap::default(),
            current_bet: 0.0,
        }
    }

    /// State with every seat's blind posted.
    pub fn with_blinds() -> Self {
        let mut contributions = FxHashMap::default();
        let mut current_bet: f64 = 0.0;
        for seat in S::ALL {
            let blind = seat.blind();
            if blind > 0.0 {
                contributions.insert(*seat, blind);
                // The big blind counts as the bet to call, so a limp puts in 1bb.
                current_bet = current_bet.max(blind);
            }
        }
        Self {
            contributions,
            current_bet,
        }
    }

    pub fn contribution(&self, seat: S) -> f64 {
        self.contributions.get(&seat).copied().unwrap_or(0.0)
    }

    pub fn current_bet(&self) -> f64 {
        self.current_bet
    }

    /// Sum of all contributions, summed in seat order.
    pub fn total(&self) -> f64 {
        S::ALL.iter().map(|s| self.contribution(*s)).sum()
    }

    /// Largest single contribution.
    pub fn largest(&self) -> f64 {
        self.contributions.values().copied().fold(0.0, f64::max)
    }

    fn with_contribution(mut self, seat: S, amount: f64, cap: f64) -> Self {
        let amount = amount.min(cap);
        self.contributions.insert(seat, amount);
        self.current_bet = self.current_bet.max(amount);
        self
    }

    /// Apply one step, returning the next state.
    pub fn apply(self, step: &Step<S>, stack_depth: f64) -> Self {
        match step.action {
            Descriptor::Fold | Descriptor::Check => self,
            Descriptor::Call => {
                let committed = self.contribution(step.actor);
                let owed = (self.current_bet - committed).max(0.0);
                self.with_contribution(step.actor, committed + owed, stack_depth)
            }
            Descriptor::AllIn => self.with_contribution(step.actor, stack_depth, stack_depth),
            Descriptor::Sized(amount) => self.with_contribution(step.actor, amount, stack_depth),
        }
    }
}

/// Result of replaying a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotSummary {
    /// Total pot, truncated to whole big blinds.
    pub pot: i64,
    /// Stack depth minus the largest contribution, truncated.
    pub effective_stack: i64,
}

/// Replays action lines against a fixed stack depth.
#[derive(Debug, Clone, Copy)]
pub struct PotAccountant {
    stack_depth: f64,
}

impl Default for PotAccountant {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_DEPTH)
    }
}

impl PotAccountant {
    pub fn new(stack_depth: f64) -> Self {
        Self { stack_depth }
    }

    pub fn stack_depth(&self) -> f64 {
        self.stack_depth
    }

    /// Replay `line` from `start`, returning the final contributions.
    pub fn replay<S: Seat>(&self, line: &ActionLine<S>, start: ContributionState<S>) -> ContributionState<S> {
        line.steps()
            .iter()
            .fold(start, |state, step| state.apply(step, self.stack_depth))
    }

    /// Every intermediate state, starting with `start`.
    pub fn trace<S: Seat>(&self, line: &ActionLine<S>, start: ContributionState<S>) -> Vec<ContributionState<S>> {
        let mut states = vec![start];
        for step in line.steps() {
            let next = states[states.len() - 1].clone().apply(step, self.stack_depth);
            states.push(next);
        }
        states
    }

    /// Summarize a finished state.
    pub fn summarize<S: Seat>(&self, state: &ContributionState<S>) -> PotSummary {
        PotSummary {
            pot: state.total().trunc() as i64,
            effective_stack: (self.stack_depth - state.largest()).trunc() as i64,
        }
    }

    /// Pot and effective stack of a preflop line, blinds included.
    pub fn preflop<S: Seat>(&self, line: &ActionLine<S>) -> PotSummary {
        self.summarize(&self.replay(line, ContributionState::with_blinds()))
    }

    /// Parse and account a raw preflop line.
    pub fn preflop_str<S: Seat>(&self, raw: &str) -> Result<PotSummary, ParseError> {
        Ok(self.preflop(&ActionLine::<S>::parse(raw)?))
    }

    /// Chips added across several betting rounds with no forced bets.
    ///
    /// Each round starts from an empty state.
    pub fn rounds<S: Seat>(&self, rounds: &[ActionLine<S>]) -> f64 {
        rounds
            .iter()
            .map(|round| self.replay(round, ContributionState::empty()).total())
            .sum()
    }
}
