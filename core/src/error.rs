//! Error type shared by the loader, the reference tables and the engine.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed timestamp line in snapshot {}", path.display())]
    SnapshotHeader { path: PathBuf },

    #[error("malformed reference table {name}: {source}")]
    Table {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pattern in rule group {group}: {source}")]
    Pattern {
        group: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("line {line}: column {column} is missing")]
    MissingColumn { line: usize, column: usize },

    #[error("line {line}: column {column} is not an integer")]
    NotInteger { line: usize, column: usize },

    #[error("unknown validator: {0}")]
    UnknownValidator(String),

    #[error("{rule} failed on {glyph}: {message}")]
    Rule {
        rule: String,
        glyph: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
