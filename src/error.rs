//! Error types for the dataset pipeline.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A key is missing from one of the reference tables.
    #[error("no entry for '{key}' in {table}")]
    Lookup { table: &'static str, key: String },

    /// An action stream, artifact or table cell does not follow its grammar.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The external solver exited unsuccessfully or produced nothing.
    #[error("solver failed for {folder}: {reason}\n{stderr}")]
    ExternalProcess {
        folder: String,
        reason: String,
        stderr: String,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shorthand for a missing reference-table entry.
    pub fn lookup(table: &'static str, key: impl Into<String>) -> Self {
        Error::Lookup {
            table,
            key: key.into(),
        }
    }

    /// Wrap an I/O error with the operation that failed.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Malformed input in an action stream or solver artifact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("action '{token}' at position {index} has no preceding actor")]
    MissingActor { index: usize, token: String },

    #[error("actor '{actor}' at position {index} is followed by another action '{token}'")]
    UnexpectedAction {
        index: usize,
        actor: String,
        token: String,
    },

    #[error("'{0}' is not a unit-suffixed bet size")]
    InvalidBetSize(String),


    #[error("unknown move '{0}'")]
    UnknownMove(String),

    #[error("invalid card '{0}'")]
    InvalidCard(String),

    #[error("{0} deal-card markers in one history (at most 2)")]
    TooManyDeals(usize),

    #[error("invalid frequency '{value}' for {hand}")]
    InvalidFrequency { hand: String, value: String },

    #[error("{hand} has {got} frequencies for {expected} moves")]
    FrequencyMismatch {
        hand: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid range entry '{0}'")]
    InvalidRangeEntry(String),

    #[error("unknown seat '{0}'")]
    UnknownSeat(String),

    #[error("cannot decode folder name '{0}'")]
    FolderName(String),
}

/// Result alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;
