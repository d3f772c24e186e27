//! Indexed action/strategy artifacts inside a board folder.
//!
//! The solver writes `actions_<n>.json` and `strategy_<n>.json` for every
//! decision point `n`. Only indices present in both families are usable; a
//! one-sided index is expected while a solve is still producing output and is
//! skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Which family an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Actions,
    Strategy,
}

impl ArtifactKind {
    fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Actions => "actions_",
            ArtifactKind::Strategy => "strategy_",
        }
    }

    /// File name of the artifact with index `index`.
    pub fn file_name(&self, index: u32) -> String {
        format!("{}{}.json", self.prefix(), index)
    }
}

/// Classify a file name as `actions_<n>.json` or `strategy_<n>.json`.
pub fn parse_artifact_name(name: &str) -> Option<(ArtifactKind, u32)> {
    [ArtifactKind::Actions, ArtifactKind::Strategy]
        .into_iter()
        .find_map(|kind| {
            let digits = name.strip_prefix(kind.prefix())?.strip_suffix(".json")?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok().map(|index| (kind, index))
        })
}

/// Values from two families that share an index.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched<A, S> {
    pub index: u32,
    pub actions: A,
    pub strategy: S,
}

/// Join two index-keyed families, in ascending index order.
///
/// Indices present in only one family are dropped and returned separately.
pub fn match_by_index<A, S>(
    actions: BTreeMap<u32, A>,
    mut strategies: BTreeMap<u32, S>,
) -> (Vec<Matched<A, S>>, Vec<u32>) {
    let mut matched = Vec::new();
    let mut gaps = Vec::new();
    for (index, a) in actions {
        match strategies.remove(&index) {
            Some(s) => matched.push(Matched {
                index,
                actions: a,
                strategy: s,
            }),
            None => gaps.push(index),
        }
    }
    gaps.extend(strategies.into_keys());
    gaps.sort_unstable();
    (matched, gaps)
}

/// Artifact file pairs of one board folder.
#[derive(Debug, Clone, Default)]
pub struct FolderScan {
    pub pairs: Vec<Matched<PathBuf, PathBuf>>,
    /// Indices found in only one family.
    pub gaps: Vec<u32>,
}

/// Collect the matched artifact pairs of `dir`.
pub fn scan_folder(dir: &Path) -> Result<FolderScan> {
    let entries =
        fs::read_dir(dir).map_err(|e| Error::io(format!("read {}", dir.display()), e))?;

    let mut actions = BTreeMap::new();
    let mut strategies = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(format!("read {}", dir.display()), e))?;
        let name = entry.file_name();
        let Some((kind, index)) = name.to_str().and_then(parse_artifact_name) else {
            continue;
        };
        match kind {
            ArtifactKind::Actions => actions.insert(index, entry.path()),
            ArtifactKind::Strategy => strategies.insert(index, entry.path()),
        };
    }

    let (pairs, gaps) = match_by_index(actions, strategies);
    for index in &gaps {
        log::debug!("{}: index {} has no counterpart, skipping", dir.display(), index);
    }
    Ok(FolderScan { pairs, gaps })
}

/// Read and deserialize one JSON artifact.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("read {}", path.display()), e))?;
    Ok(serde_json::from_str(&text)?)
}

/// Whether `dir` holds at least one actions artifact.
pub fn has_artifacts(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name()
                    .to_str()
                    .and_then(parse_artifact_name)
                    .is_some_and(|(kind, _)| kind == ArtifactKind::Actions)
            })
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_artifact_name() {
        assert_eq!(parse_artifact_name("actions_54.json"), Some((ArtifactKind::Actions, 54)));
        assert_eq!(parse_artifact_name("strategy_0.json"), Some((ArtifactKind::Strategy, 0)));
        assert_eq!(parse_artifact_name("actions_.json"), None);
        assert_eq!(parse_artifact_name("actions_5a.json"), None);
        assert_eq!(parse_artifact_name("actions_+5.json"), None);
        assert_eq!(parse_artifact_name("actions_5.txt"), None);
        assert_eq!(parse_artifact_name("result_5.json"), None);
        assert_eq!(ArtifactKind::Strategy.file_name(7), "strategy_7.json");
    }

    #[test]
    fn test_match_by_index_skips_one_sided() {
        let actions: BTreeMap<u32, &str> = [(0, "a0"), (1, "a1"), (3, "a3")].into_iter().collect();
        let strategies: BTreeMap<u32, &str> = [(1, "s1"), (2, "s2"), (3, "s3")].into_iter().collect();

        let (matched, gaps) = match_by_index(actions, strategies);
        assert_eq!(
            matched,
            vec![
                Matched { index: 1, actions: "a1", strategy: "s1" },
                Matched { index: 3, actions: "a3", strategy: "s3" },
            ]
        );
        assert_eq!(gaps, vec![0, 2]);
    }

    #[test]
    fn test_scan_folder() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["actions_1.json", "strategy_1.json", "actions_2.json", "strategy_10.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let scan = scan_folder(dir.path()).unwrap();
        assert_eq!(scan.pairs.len(), 1);
        assert_eq!(scan.pairs[0].index, 1);
        assert!(scan.pairs[0].actions.ends_with("actions_1.json"));
        assert_eq!(scan.gaps, vec![2, 10]);
        assert!(has_artifacts(dir.path()));
    }

    #[test]
    fn test_empty_folder_has_no_artifacts() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!has_artifacts(dir.path()));
        assert!(!has_artifacts(&dir.path().join("missing")));
    }
}
