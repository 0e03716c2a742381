//! Error types for cardql.

use std::path::PathBuf;

use thiserror::Error;

/// A query string could not be tokenized or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at position {position}: {message}")]
pub struct ParseError {
    /// Byte offset into the query where the problem was detected.
    pub position: usize,
    pub message: String,
}

impl ParseError {
    /// Create a parse error at the given position.
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Error surfaced by the search entry points.
///
/// Unknown fields and unparseable values are not errors; they resolve to
/// "no opinion" during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query string was malformed.
    #[error("Query error: {0}")]
    Parse(#[from] ParseError),
}

impl QueryError {
    /// The underlying human-readable message.
    pub fn message(&self) -> &str {
        match self {
            QueryError::Parse(e) => &e.message,
        }
    }
}

/// Failures while loading a corpus or a config file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading a file failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus file is not valid card JSON.
    #[error("Invalid corpus JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The config file is not valid TOML for the config schema.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A card carries a color letter outside WUBRG.
    #[error("Card '{card}' has invalid color '{color}'")]
    InvalidColor { card: String, color: char },
}

impl LoadError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
