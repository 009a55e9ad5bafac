//! Hard failures: broken level files, unusable configuration, no GPU texture.
//!
//! Expected "not found" conditions (no path, off-screen sprite, damaging a
//! corpse) are plain values elsewhere and never reach this type.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config is not valid JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("map has no rows")]
    EmptyMap,
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("map has no player spawn ('P')")]
    MissingPlayerSpawn,
    #[error("unknown map symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("graphics setup failed: {0}")]
    Graphics(String),
}
