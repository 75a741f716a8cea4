//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// The syntax tree did not hold up its contract.
///
/// These should not occur for any input the markdown parser accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("end event at byte {offset} has no open element")]
    UnbalancedEnd { offset: usize },

    #[error("element opened at byte {offset} was never closed")]
    UnclosedNode { offset: usize },

    #[error("node range {start}..{end} is outside the {len}-byte source")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
}

/// Conversion of a markdown document into blocks failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("malformed syntax tree: {0}")]
    Syntax(#[from] SyntaxError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}
