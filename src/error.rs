//! Error taxonomy of the analysis core.
//!
//! Only two things can fail: loading the lexicon (fatal, reported with the
//! offending category or file) and handing the normalizer something that is
//! not text. Scoring, classification and aggregation are total.

use std::path::PathBuf;
use thiserror::Error;

/// Lexicon source could not be turned into a usable store.
#[derive(Debug, Error)]
pub enum LexiconLoadError {
    #[error("failed to read lexicon at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon is not valid JSON for the expected schema: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported lexicon version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("lexicon category `{category}` is missing")]
    MissingCategory { category: &'static str },

    #[error("lexicon category `{category}` is empty")]
    EmptyCategory { category: &'static str },

    #[error("duplicate term `{term}` in lexicon category `{category}`")]
    DuplicateTerm { category: &'static str, term: String },

    #[error("invalid weight {weight} for `{term}` in lexicon category `{category}`: {reason}")]
    InvalidWeight {
        category: &'static str,
        term: String,
        weight: f64,
        reason: &'static str,
    },

    #[error("modifier `{term}` in lexicon category `{category}` must be a single word")]
    MultiWordModifier { category: &'static str, term: String },

    #[error("invalid slang mapping `{term}` -> `{canonical}`: {reason}")]
    InvalidSlang {
        term: String,
        canonical: String,
        reason: &'static str,
    },
}

impl LexiconLoadError {
    /// Lexicon category (or `"file"`) the failure belongs to, for user-facing reports.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io { .. } | Self::Malformed(_) | Self::UnsupportedVersion { .. } => "file",
            Self::MissingCategory { category }
            | Self::EmptyCategory { category }
            | Self::DuplicateTerm { category, .. }
            | Self::InvalidWeight { category, .. }
            | Self::MultiWordModifier { category, .. } => *category,
            Self::InvalidSlang { .. } => "slang",
        }
    }
}

/// Input handed to the normalizer was not text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("comment is not valid UTF-8 (first invalid byte at offset {offset})")]
    NotUtf8 { offset: usize },

    #[error("comment field `{field}` must be a string, got {found}")]
    NotAString { field: &'static str, found: &'static str },
}
