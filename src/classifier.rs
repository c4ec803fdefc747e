//! # Classifier
//! Maps a raw polarity sum to a label with a symmetric threshold `T`:
//! `score > T` → Positive, `score < -T` → Negative, anything else (including
//! exactly ±T and NaN) → Neutral.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_THRESHOLD: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Non-negative; calibrated against raw (not length-normalized) sums.
    pub threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    threshold: f64,
}

impl Classifier {
    /// Negative or non-finite thresholds fall back to the default.
    pub fn new(config: ClassifierConfig) -> Self {
        let threshold = if config.threshold.is_finite() && config.threshold >= 0.0 {
            config.threshold
        } else {
            warn!(
                target: "classifier",
                threshold = config.threshold,
                "invalid threshold; using default"
            );
            DEFAULT_THRESHOLD
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classify(&self, score: f64) -> Label {
        if score > self.threshold {
            Label::Positive
        } else if score < -self.threshold {
            Label::Negative
        } else {
            Label::Neutral
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
