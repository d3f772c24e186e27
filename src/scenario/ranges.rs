//! Preflop ranges used to seed the solver.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ParseError, Result};

/// Range value as stored in the ranges file: either the `combo:freq` list
/// itself or a list whose first element is that string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    Text(String),
    List(Vec<String>),
}

impl RangeSpec {
    fn text(&self) -> Option<&str> {
        match self {
            RangeSpec::Text(s) => Some(s),
            RangeSpec::List(items) => items.first().map(String::as_str),
        }
    }
}

/// Preflop ranges keyed by scenario label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreflopRanges {
    ranges: FxHashMap<String, RangeSpec>,
}

impl PreflopRanges {
    pub fn new(ranges: FxHashMap<String, RangeSpec>) -> Self {
        Self { ranges }
    }

    /// Combos of `label` played more often than `threshold`, comma-joined in
    /// file order, in the solver's range syntax.
    pub fn combos_above(&self, label: &str, threshold: f64) -> Result<String> {
        let text = self
            .ranges
            .get(label)
            .and_then(RangeSpec::text)
            .ok_or_else(|| Error::lookup("preflop ranges", label))?;

        let mut kept = Vec::new();
        for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (combo, freq) = entry
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidRangeEntry(entry.to_string()))?;
            let freq: f64 = freq
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidRangeEntry(entry.to_string()))?;
            if freq > threshold {
                kept.push(combo.trim());
            }
        }
        Ok(kept.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges() -> PreflopRanges {
        serde_json::from_str(
            r#"{
                "UTG_RFI": ["AA:1.0,AKs:0.9,A5s:0.5,72o:0.0"],
                "CO_vs_UTG": "QQ:0.7, JTs:0.2"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_combos_above_threshold() {
        let ranges = ranges();
        assert_eq!(ranges.combos_above("UTG_RFI", 0.5).unwrap(), "AA,AKs");
        assert_eq!(ranges.combos_above("CO_vs_UTG", 0.5).unwrap(), "QQ");
        assert_eq!(ranges.combos_above("CO_vs_UTG", 0.1).unwrap(), "QQ,JTs");
    }

    #[test]
    fn test_missing_label() {
        assert!(matches!(
            ranges().combos_above("BB_vs_BTN", 0.5),
            Err(Error::Lookup { .. })
        ));
    }

    #[test]
    fn test_malformed_entry() {
        let ranges: PreflopRanges = serde_json::from_str(r#"{"X": "AA:1.0,KK"}"#).unwrap();
        assert!(matches!(
            ranges.combos_above("X", 0.5),
            Err(Error::Parse(ParseError::InvalidRangeEntry(_)))
        ));
    }
}
