//! Runtime configuration (TOML file + env overrides).

pub mod analyzer;

pub use analyzer::{
    AnalyzerConfig, LexiconConfig, DEFAULT_ANALYZER_CONFIG_PATH, DEFAULT_LEXICON_PATH,
    ENV_ANALYZER_CONFIG_PATH, ENV_LEXICON_PATH, ENV_NEGATION_WINDOW, ENV_SCORER_WINDOW,
    ENV_SENTIMENT_THRESHOLD,
};
