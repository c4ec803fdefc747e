//! # Polarity Scorer
//! Walks a normalized token sequence and accumulates a raw (not length-normalized)
//! polarity sum.
//!
//! For every polarity match with weight `W` exactly one modifier applies:
//! 1. an unconsumed negator within `negation_window` preceding tokens → `-W`.
//!    Intensifier/diminisher tokens in between do not take a slot (`tidak terlalu bagus`).
//! 2. else the nearest unconsumed intensifier/diminisher within `window` preceding tokens
//! 3. else the nearest unconsumed intensifier/diminisher within `lookahead` following
//!    tokens (post-positional `banget`)
//!
//! Modifier tokens are never scored as polarity terms, and a modifier is consumed by
//! the first match that uses it. Consumption is tracked in a `Vec<bool>` sized to the
//! token sequence. Explicit multi-word polarity phrases win over single tokens.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lexicon::{LexiconStore, ModifierRole, Scaling};

pub const DEFAULT_NEGATION_WINDOW: usize = 1;
pub const DEFAULT_WINDOW: usize = 2;
pub const DEFAULT_LOOKAHEAD: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Preceding word slots searched for a negator.
    pub negation_window: usize,
    /// Preceding tokens searched for intensifiers/diminishers.
    pub window: usize,
    /// Following tokens searched for post-positional intensifiers/diminishers.
    pub lookahead: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            negation_window: DEFAULT_NEGATION_WINDOW,
            window: DEFAULT_WINDOW,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

/// Modifier applied to one matched polarity term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modifier {
    None,
    Negated { by: String },
    Intensified { by: String, factor: f64 },
    Diminished { by: String, factor: f64 },
}

impl Modifier {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// One polarity hit, kept for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedTerm {
    pub term: String,
    /// Lexicon weight before modification.
    pub weight: f64,
    pub modifier: Modifier,
    /// Weight after modification, as added to the total.
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scored {
    pub score: f64,
    pub matched: Vec<MatchedTerm>,
}

#[derive(Debug, Clone)]
pub struct PolarityScorer {
    lexicon: Arc<LexiconStore>,
    config: ScorerConfig,
}

impl PolarityScorer {
    pub fn new(lexicon: Arc<LexiconStore>, config: ScorerConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn config(&self) -> ScorerConfig {
        self.config
    }

    /// Total over any input; an empty sequence scores 0.0 with no matches.
    pub fn score<S: AsRef<str>>(&self, tokens: &[S]) -> Scored {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        let n = tokens.len();
        let mut consumed = vec![false; n];
        let mut total = 0.0f64;
        let mut matched = Vec::new();

        let mut i = 0;
        while i < n {
            if consumed[i] {
                i += 1;
                continue;
            }
            let hit = self
                .phrase_at(&tokens, &consumed, i, 2)
                .or_else(|| match self.lexicon.modifier(tokens[i]) {
                    Some(_) => None,
                    None => self.phrase_at(&tokens, &consumed, i, 1),
                });
            let Some((len, weight)) = hit else {
                i += 1;
                continue;
            };

            let end = i + len;
            consumed[i..end].iter_mut().for_each(|c| *c = true);
            let (modifier, contribution) =
                self.apply_modifier(&tokens, &mut consumed, i, end, weight);

            total += contribution;
            matched.push(MatchedTerm {
                term: tokens[i..end].join(" "),
                weight,
                modifier,
                contribution,
            });
            i = end;
        }

        Scored {
            score: round_score(total),
            matched,
        }
    }

    /// Longest polarity phrase of at least `min_len` tokens starting at `start`
    /// made of unconsumed tokens. Returns `(len, weight)`.
    fn phrase_at(
        &self,
        tokens: &[&str],
        consumed: &[bool],
        start: usize,
        min_len: usize,
    ) -> Option<(usize, f64)> {
        let max_len = self.lexicon.max_phrase_len().min(tokens.len() - start);
        (min_len..=max_len).rev().find_map(|len| {
            let span = start..start + len;
            if consumed[span.clone()].iter().any(|&c| c) {
                return None;
            }
            self.lexicon
                .polarity(&tokens[span].join(" "))
                .map(|w| (len, w))
        })
    }

    fn apply_modifier(
        &self,
        tokens: &[&str],
        consumed: &mut [bool],
        start: usize,
        end: usize,
        weight: f64,
    ) -> (Modifier, f64) {
        let before: Vec<usize> = (1..=self.config.window)
            .filter_map(|k| start.checked_sub(k))
            .filter(|&j| !consumed[j])
            .collect();

        // Negation takes precedence over scaling.
        if let Some(j) = self.negator_before(tokens, consumed, start) {
            consumed[j] = true;
            return (
                Modifier::Negated {
                    by: tokens[j].to_string(),
                },
                -weight,
            );
        }

        let scaling_before = before.iter().find_map(|&j| {
            self.scaling(tokens[j])
                .filter(|(_, s)| s.position.allows_before())
                .map(|found| (j, found))
        });
        let scaling = scaling_before.or_else(|| {
            (end..end.saturating_add(self.config.lookahead).min(tokens.len()))
                .filter(|&j| !consumed[j])
                .find_map(|j| {
                    self.scaling(tokens[j])
                        .filter(|(_, s)| s.position.allows_after())
                        .map(|found| (j, found))
                })
        });

        match scaling {
            Some((j, (intensify, s))) => {
                consumed[j] = true;
                let by = tokens[j].to_string();
                let modifier = if intensify {
                    Modifier::Intensified {
                        by,
                        factor: s.factor,
                    }
                } else {
                    Modifier::Diminished {
                        by,
                        factor: s.factor,
                    }
                };
                (modifier, weight * s.factor)
            }
            None => (Modifier::None, weight),
        }
    }

    /// Nearest unconsumed negator within `negation_window` word slots before `start`.
    /// Intensifiers/diminishers are stepped over without using a slot.
    fn negator_before(&self, tokens: &[&str], consumed: &[bool], start: usize) -> Option<usize> {
        let reach = self.config.negation_window + self.config.window;
        let mut slots = 0;
        for j in (0..start).rev().take(reach) {
            if self.scaling(tokens[j]).is_some() {
                continue;
            }
            if slots == self.config.negation_window {
                break;
            }
            slots += 1;
            if !consumed[j] && self.lexicon.is_negator(tokens[j]) {
                return Some(j);
            }
        }
        None
    }

    /// `(is_intensifier, scaling)` for intensifier/diminisher tokens.
    fn scaling(&self, token: &str) -> Option<(bool, Scaling)> {
        match self.lexicon.modifier(token)? {
            ModifierRole::Intensifier(s) => Some((true, s)),
            ModifierRole::Diminisher(s) => Some((false, s)),
            ModifierRole::Negator => None,
        }
    }
}

/// Round to three decimals; also turns `-0.0` into `0.0`.
pub fn round_score(x: f64) -> f64 {
    let r = (x * 1000.0).round() / 1000.0;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}
