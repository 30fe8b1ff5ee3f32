//! errors.rs - Custom error types for the ptkit-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;
use ptkit_lexical::ScoreError;

/// This enum represents all possible error types in the `ptkit-core` library.
///
/// New variants may be added in future versions, hence `#[non_exhaustive]`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PtkitError {
    #[error("Malformed phrase-table record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Invalid feature value '{value}' for feature '{name}'")]
    InvalidFeature { name: String, value: String },

    #[error("Malformed lexicon entry at line {line}: {reason}")]
    LexiconFormat { line: usize, reason: String },

    #[error("Unsupported lexicon model version {0}")]
    UnsupportedLexiconVersion(u8),

    #[error("Invalid filter rule '{0}': {1}")]
    InvalidFilterRule(String, String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Scoring failed at line {line}: {source}")]
    Scoring {
        line: usize,
        #[source]
        source: ScoreError,
    },

    #[error("Failed to decode binary lexicon: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Failed to encode binary lexicon: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
