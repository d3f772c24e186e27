//! Collapsing per-hand strategies into supervised labels.
//!
//! The solver writes one `strategy_<n>.json` per decision point: for every
//! holding of the acting player, the frequency of each available move, in
//! the same order as the node's move list.
//!
//! A holding is labeled only when one move is played more often than the
//! confidence threshold. Mixed strategies produce no label and are left out
//! of the dataset.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Default confidence threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Raw entry of a strategy artifact. Frequencies are decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrequency {
    pub hand: String,
    pub frequencies: Vec<String>,
    #[serde(default)]
    pub equity: f32,
    #[serde(default)]
    pub ev: f32,
}

/// A holding with its move frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyEntry {
    pub holding: String,
    pub frequencies: Vec<f64>,
}

impl StrategyEntry {
    pub fn new(holding: impl Into<String>, frequencies: Vec<f64>) -> Self {
        Self {
            holding: holding.into(),
            frequencies,
        }
    }
}

impl TryFrom<&HandFrequency> for StrategyEntry {
    type Error = ParseError;

    fn try_from(raw: &HandFrequency) -> Result<Self, ParseError> {
        let frequencies = raw
            .frequencies
            .iter()
            .map(|value| {
                value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .ok_or_else(|| ParseError::InvalidFrequency {
                        hand: raw.hand.clone(),
                        value: value.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(raw.hand.clone(), frequencies))
    }
}

/// Parse every entry of a strategy artifact.
pub fn parse_entries(raw: &[HandFrequency]) -> Result<Vec<StrategyEntry>, ParseError> {
    raw.iter().map(StrategyEntry::try_from).collect()
}

/// A labeled holding: the index of its dominant move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub holding: String,
    pub index: usize,
}

/// Reduces frequency vectors to dominant-move labels.
#[derive(Debug, Clone, Copy)]
pub struct StrategyReducer {
    threshold: f64,
}

impl Default for StrategyReducer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl StrategyReducer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Index of the most frequent move, if any frequency strictly exceeds
    /// the threshold.
    ///
    /// An exact tie between maxima resolves to the lowest index. With a
    /// threshold of 0.5 or more a tie cannot occur, so this only matters
    /// for lower thresholds.
    pub fn dominant(&self, frequencies: &[f64]) -> Option<usize> {
        if !frequencies.iter().any(|&f| f > self.threshold) {
            return None;
        }
        let mut best = 0;
        for (i, &f) in frequencies.iter().enumerate().skip(1) {
            if f > frequencies[best] {
                best = i;
            }
        }
        Some(best)
    }

    /// Label every holding with a dominant move; drop the rest.
    pub fn reduce(&self, entries: &[StrategyEntry]) -> Vec<Decision> {
        entries
            .iter()
            .filter_map(|entry| {
                self.dominant(&entry.frequencies).map(|index| Decision {
                    holding: entry.holding.clone(),
                    index,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(hand: &str, freqs: &[&str]) -> HandFrequency {
        HandFrequency {
            hand: hand.into(),
            frequencies: freqs.iter().map(|f| f.to_string()).collect(),
            equity: 0.0,
            ev: 0.0,
        }
    }

    fn reduce(raw_entries: &[HandFrequency], threshold: f64) -> Vec<Decision> {
        let entries = parse_entries(raw_entries).unwrap();
        StrategyReducer::new(threshold).reduce(&entries)
    }

    #[test]
    fn test_dominant_move_is_labeled() {
        let decisions = reduce(&[raw("AsKs", &["0.3", "0.6", "0.1"])], 0.5);
        assert_eq!(decisions, vec![Decision { holding: "AsKs".into(), index: 1 }]);
    }

    #[test]
    fn test_mixed_strategy_is_dropped() {
        assert!(reduce(&[raw("7h2c", &["0.4", "0.4", "0.2"])], 0.5).is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(reduce(&[raw("QdQc", &["0.5", "0.5"])], 0.5).is_empty());
        assert_eq!(reduce(&[raw("QdQc", &["0.5001", "0.4999"])], 0.5)[0].index, 0);
    }

    #[test]
    fn test_tie_resolves_to_lowest_index() {
        let decisions = reduce(&[raw("JhTh", &["0.1", "0.45", "0.45"])], 0.4);
        assert_eq!(decisions[0].index, 1);

        let reducer = StrategyReducer::new(0.2);
        assert_eq!(reducer.dominant(&[0.3, 0.3, 0.3]), Some(0));
    }

    #[test]
    fn test_order_is_preserved() {
        let decisions = reduce(
            &[
                raw("AsKs", &["0.9", "0.1"]),
                raw("7h2c", &["0.5", "0.5"]),
                raw("9d9c", &["0.2", "0.8"]),
            ],
            DEFAULT_THRESHOLD,
        );
        let holdings: Vec<_> = decisions.iter().map(|d| d.holding.as_str()).collect();
        assert_eq!(holdings, vec!["AsKs", "9d9c"]);
    }

    #[test]
    fn test_invalid_frequency() {
        let err = parse_entries(&[raw("AsKs", &["0.3", "abc"])]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidFrequency { hand: "AsKs".into(), value: "abc".into() }
        );
        assert!(parse_entries(&[raw("AsKs", &["NaN"])]).is_err());
    }

    #[test]
    fn test_parse_artifact() {
        let raw: Vec<HandFrequency> = serde_json::from_str(
            r#"[{"hand": "TsTh", "frequencies": ["0.9000", "0.1000"], "equity": 0.8, "ev": 12.5}]"#,
        )
        .unwrap();
        let entries = parse_entries(&raw).unwrap();
        assert_eq!(entries[0].frequencies, vec![0.9, 0.1]);
    }
}
