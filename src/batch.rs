//! # Analysis Batch
//! Results of one run plus the aggregates the visualization layer consumes:
//! label counts/percentages, average score, score histogram and word
//! frequencies for word clouds. Aggregates are derived on demand, never stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classifier::Label;
use crate::lexicon::LexiconStore;
use crate::normalize::is_emoji;
use crate::sentiment::SentimentResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub histogram_bins: usize,
    pub top_words: usize,
    /// Words shorter than this (in chars) are left out of word clouds.
    pub min_word_len: usize,
    /// Scoring threads for large batches; 0 = available parallelism.
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            top_words: 20,
            min_word_len: 3,
            workers: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    /// Percentages rounded to one decimal.
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
    /// Mean score rounded to three decimals.
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Snapshot handed to chart / word-cloud renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub histogram: Vec<HistogramBin>,
    pub top_words: Vec<WordCount>,
    pub top_positive_words: Vec<WordCount>,
    pub top_negative_words: Vec<WordCount>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisBatch {
    pub results: Vec<SentimentResult>,
}

impl AnalysisBatch {
    pub fn new(results: Vec<SentimentResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Counts, percentages and average. An empty batch is all zeros.
    pub fn summary(&self) -> BatchSummary {
        let total = self.results.len();
        if total == 0 {
            return BatchSummary::default();
        }

        let count = |label: Label| self.results.iter().filter(|r| r.label == label).count();
        let positive_count = count(Label::Positive);
        let negative_count = count(Label::Negative);
        let neutral_count = count(Label::Neutral);
        let pct = |n: usize| round_to(n as f64 / total as f64 * 100.0, 1);
        let sum: f64 = self.results.iter().map(|r| r.score).sum();

        BatchSummary {
            total,
            positive_count,
            negative_count,
            neutral_count,
            positive_pct: pct(positive_count),
            negative_pct: pct(negative_count),
            neutral_pct: pct(neutral_count),
            average_score: round_to(sum / total as f64, 3),
        }
    }

    /// Equal-width bins over `[min, max]` of the scores. A batch where every
    /// score is the same yields a single bin.
    pub fn histogram(&self, bins: usize) -> Vec<HistogramBin> {
        let scores: Vec<f64> = self
            .results
            .iter()
            .map(|r| r.score)
            .filter(|s| s.is_finite())
            .collect();
        if scores.is_empty() {
            return Vec::new();
        }

        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if bins <= 1 || max == min {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: scores.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();
        for s in scores {
            let idx = (((s - min) / width).floor() as usize).min(bins - 1);
            out[idx].count += 1;
        }
        out
    }

    /// Most frequent normalized words, optionally restricted to one label.
    /// Stopwords, emoji and words shorter than `min_word_len` are skipped.
    /// Ties are broken alphabetically so output is deterministic.
    pub fn top_words(
        &self,
        lexicon: &LexiconStore,
        label: Option<Label>,
        min_word_len: usize,
        top_n: usize,
    ) -> Vec<WordCount> {
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for r in self
            .results
            .iter()
            .filter(|r| label.map_or(true, |l| r.label == l))
        {
            for tok in &r.normalized_tokens {
                let tok = tok.as_str();
                if tok.chars().count() < min_word_len
                    || tok.chars().all(is_emoji)
                    || lexicon.is_stopword(tok)
                {
                    continue;
                }
                *freq.entry(tok).or_insert(0) += 1;
            }
        }

        let mut words: Vec<WordCount> = freq
            .into_iter()
            .map(|(word, count)| WordCount {
                word: word.to_string(),
                count,
            })
            .collect();
        words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        words.truncate(top_n);
        words
    }

    pub fn report(&self, lexicon: &LexiconStore, config: &BatchConfig) -> BatchReport {
        let words = |label| self.top_words(lexicon, label, config.min_word_len, config.top_words);
        BatchReport {
            summary: self.summary(),
            histogram: self.histogram(config.histogram_bins),
            top_words: words(None),
            top_positive_words: words(Some(Label::Positive)),
            top_negative_words: words(Some(Label::Negative)),
        }
    }
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}
