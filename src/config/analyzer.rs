// src/config/analyzer.rs
//! Analyzer configuration: `config/analyzer.toml`, overridable from env.
//!
//! ```toml
//! [lexicon]
//! path = "config/lexicon_id.json"
//!
//! [normalizer]
//! keep_hashtag_words = false
//!
//! [scorer]
//! negation_window = 1
//! window = 2
//! lookahead = 1
//!
//! [classifier]
//! threshold = 0.0
//!
//! [batch]
//! histogram_bins = 20
//! top_words = 20
//! min_word_len = 3
//! workers = 0
//!
//! [history]
//! capacity = 200
//! snapshot_path = "data/sessions.json"
//! ```
//!
//! Every section and key is optional. Env overrides: `LEXICON_PATH`,
//! `SENTIMENT_THRESHOLD`, `SCORER_WINDOW`, `NEGATION_WINDOW`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::batch::BatchConfig;
use crate::classifier::ClassifierConfig;
use crate::history::HistoryConfig;
use crate::normalize::NormalizerConfig;
use crate::scorer::ScorerConfig;

pub const DEFAULT_ANALYZER_CONFIG_PATH: &str = "config/analyzer.toml";
pub const DEFAULT_LEXICON_PATH: &str = "config/lexicon_id.json";

pub const ENV_ANALYZER_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";
pub const ENV_LEXICON_PATH: &str = "LEXICON_PATH";
pub const ENV_SENTIMENT_THRESHOLD: &str = "SENTIMENT_THRESHOLD";
pub const ENV_SCORER_WINDOW: &str = "SCORER_WINDOW";
pub const ENV_NEGATION_WINDOW: &str = "NEGATION_WINDOW";

const MAX_WINDOW: usize = 10;
const MAX_WORKERS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub path: PathBuf,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LEXICON_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub lexicon: LexiconConfig,
    pub normalizer: NormalizerConfig,
    pub scorer: ScorerConfig,
    pub classifier: ClassifierConfig,
    pub batch: BatchConfig,
    pub history: HistoryConfig,
}

impl AnalyzerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading analyzer config from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing analyzer config at {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: AnalyzerConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Resolve config:
    /// 1) $ANALYZER_CONFIG_PATH (must exist if set)
    /// 2) config/analyzer.toml
    /// 3) built-in defaults
    ///
    /// then apply env overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(ENV_ANALYZER_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_ANALYZER_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::load_from_file(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_ANALYZER_CONFIG_PATH);
                if default.exists() {
                    Self::load_from_file(&default)?
                } else {
                    info!(target: "config", "no analyzer config file; using defaults");
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(p) = std::env::var(ENV_LEXICON_PATH) {
            if !p.trim().is_empty() {
                self.lexicon.path = PathBuf::from(p.trim());
            }
        }
        if let Some(t) = parse_threshold_env(std::env::var(ENV_SENTIMENT_THRESHOLD).ok()) {
            self.classifier.threshold = t;
        }
        if let Some(w) =
            parse_window_env(ENV_SCORER_WINDOW, std::env::var(ENV_SCORER_WINDOW).ok())
        {
            self.scorer.window = w;
        }
        if let Some(w) =
            parse_window_env(ENV_NEGATION_WINDOW, std::env::var(ENV_NEGATION_WINDOW).ok())
        {
            self.scorer.negation_window = w;
        }
        self.sanitize();
    }

    /// Clamp out-of-range values back to something usable.
    fn sanitize(&mut self) {
        if !(self.classifier.threshold.is_finite() && self.classifier.threshold >= 0.0) {
            warn!(target: "config", threshold = self.classifier.threshold, "threshold must be >= 0; using default");
            self.classifier = ClassifierConfig::default();
        }
        if self.scorer.window > MAX_WINDOW {
            warn!(target: "config", window = self.scorer.window, "scorer window too large; clamped");
            self.scorer.window = MAX_WINDOW;
        }
        if self.scorer.negation_window > MAX_WINDOW {
            warn!(target: "config", negation_window = self.scorer.negation_window, "negation window too large; clamped");
            self.scorer.negation_window = MAX_WINDOW;
        }
        if self.scorer.lookahead > MAX_WINDOW {
            self.scorer.lookahead = MAX_WINDOW;
        }
        if self.batch.workers > MAX_WORKERS {
            warn!(target: "config", workers = self.batch.workers, "too many batch workers; clamped");
            self.batch.workers = MAX_WORKERS;
        }
        if self.batch.histogram_bins == 0 {
            self.batch.histogram_bins = BatchConfig::default().histogram_bins;
        }
    }
}

// parse optional non-negative float env
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            warn!(target: "config", value = %raw, "ignoring invalid {ENV_SENTIMENT_THRESHOLD}");
            None
        }
    }
}

fn parse_window_env(name: &str, raw: Option<String>) -> Option<usize> {
    let raw = raw?;
    match raw.trim().parse::<usize>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(target: "config", value = %raw, "ignoring invalid {name}");
            None
        }
    }
}
