// tests/common/mod.rs
// Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use indo_sentiment_analyzer::{AnalyzerConfig, LexiconStore, SentimentAnalyzer};

/// Path of the lexicon shipped with the service (tests run from the package root).
pub const SHIPPED_LEXICON: &str = "config/lexicon_id.json";

pub fn shipped_lexicon() -> Arc<LexiconStore> {
    Arc::new(LexiconStore::load(SHIPPED_LEXICON).expect("shipped lexicon must load"))
}

pub fn analyzer() -> SentimentAnalyzer {
    SentimentAnalyzer::new(shipped_lexicon(), AnalyzerConfig::default())
}

pub fn analyzer_with(config: AnalyzerConfig) -> SentimentAnalyzer {
    SentimentAnalyzer::new(shipped_lexicon(), config)
}
