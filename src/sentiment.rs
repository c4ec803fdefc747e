//! Normalizer → scorer → classifier, packaged as one analyzer that owns the
//! shared lexicon handle.

use std::sync::Arc;
use std::thread;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::batch::AnalysisBatch;
use crate::classifier::{Classifier, Label};
use crate::config::AnalyzerConfig;
use crate::error::{InvalidInputError, LexiconLoadError};
use crate::lexicon::LexiconStore;
use crate::normalize::Normalizer;
use crate::scorer::{MatchedTerm, PolarityScorer};

/// Comment as delivered by a collaborator: `text` plus opaque metadata
/// (author, video URL, …) that is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    pub text: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl RawComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Map::new(),
        }
    }

    /// Build from an untyped JSON object; `text` must be a string.
    pub fn from_value(value: Value) -> Result<Self, InvalidInputError> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(InvalidInputError::NotAString {
                    field: "text",
                    found: json_type(&other),
                })
            }
        };
        match obj.remove("text") {
            Some(Value::String(text)) => Ok(Self {
                text,
                metadata: obj,
            }),
            Some(other) => Err(InvalidInputError::NotAString {
                field: "text",
                found: json_type(&other),
            }),
            None => Err(InvalidInputError::NotAString {
                field: "text",
                found: "nothing",
            }),
        }
    }
}

pub(crate) fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Scored comment. A value: created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub raw_text: String,
    pub normalized_tokens: Vec<String>,
    pub score: f64,
    pub label: Label,
    pub matched_terms: Vec<MatchedTerm>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Arc<LexiconStore>,
    normalizer: Normalizer,
    scorer: PolarityScorer,
    classifier: Classifier,
    config: AnalyzerConfig,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Arc<LexiconStore>, config: AnalyzerConfig) -> Self {
        Self {
            normalizer: Normalizer::new(lexicon.clone(), config.normalizer.clone()),
            scorer: PolarityScorer::new(lexicon.clone(), config.scorer),
            classifier: Classifier::new(config.classifier),
            lexicon,
            config,
        }
    }

    /// Load the lexicon named by the config. A broken lexicon is fatal.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, LexiconLoadError> {
        let lexicon = LexiconStore::load(&config.lexicon.path)?;
        Ok(Self::new(Arc::new(lexicon), config))
    }

    pub fn lexicon(&self) -> &LexiconStore {
        &self.lexicon
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn scorer(&self) -> &PolarityScorer {
        &self.scorer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn analyze(&self, text: &str) -> SentimentResult {
        self.analyze_comment(RawComment::new(text))
    }

    pub fn analyze_comment(&self, comment: RawComment) -> SentimentResult {
        let tokens = self.normalizer.normalize(&comment.text);
        let scored = self.scorer.score(&tokens);
        let label = self.classifier.classify(scored.score);

        counter!("sentiment_comments_total", "label" => label.as_str()).increment(1);
        histogram!("sentiment_score").record(scored.score);
        // Never log raw text. Only hashed id + counts.
        debug!(
            target: "sentiment",
            id = %anon_hash(&comment.text),
            tokens = tokens.len(),
            matches = scored.matched.len(),
            score = scored.score,
            %label,
            "comment scored"
        );

        SentimentResult {
            raw_text: comment.text,
            normalized_tokens: tokens,
            score: scored.score,
            label,
            matched_terms: scored.matched,
            metadata: comment.metadata,
        }
    }

    pub fn analyze_bytes(&self, raw: &[u8]) -> Result<SentimentResult, InvalidInputError> {
        let text = std::str::from_utf8(raw).map_err(|e| InvalidInputError::NotUtf8 {
            offset: e.valid_up_to(),
        })?;
        Ok(self.analyze(text))
    }

    /// Score comments one after another.
    pub fn analyze_batch(&self, comments: Vec<RawComment>) -> AnalysisBatch {
        let results = comments
            .into_iter()
            .map(|c| self.analyze_comment(c))
            .collect();
        AnalysisBatch::new(results)
    }

    /// Score comments on `workers` scoped threads (0 = available parallelism).
    /// Results come back in input order.
    pub fn analyze_batch_parallel(&self, comments: Vec<RawComment>, workers: usize) -> AnalysisBatch {
        let workers = match workers {
            0 => thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        }
        .min(comments.len());
        if workers <= 1 || comments.len() < 2 {
            return self.analyze_batch(comments);
        }

        let chunk_size = comments.len().div_ceil(workers);
        let mut chunks: Vec<Vec<RawComment>> = Vec::with_capacity(workers);
        let mut rest = comments.into_iter();
        loop {
            let chunk: Vec<RawComment> = rest.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            chunks.push(chunk);
        }

        let results = thread::scope(|s| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| {
                    s.spawn(move || {
                        chunk
                            .into_iter()
                            .map(|c| self.analyze_comment(c))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                .collect()
        });
        AnalysisBatch::new(results)
    }
}

/// Short stable id for a text (first 6 bytes of SHA-256, hex).
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_comment_keeps_metadata() {
        let c = RawComment::from_value(json!({
            "text": "mantap",
            "username": "budi",
            "video_url": "https://example.invalid/v/1"
        }))
        .unwrap();
        assert_eq!(c.text, "mantap");
        assert_eq!(c.metadata["username"], "budi");
        assert!(!c.metadata.contains_key("text"));
    }

    #[test]
    fn raw_comment_rejects_non_string_text() {
        let err = RawComment::from_value(json!({ "text": 42 })).unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::NotAString {
                field: "text",
                found: "number"
            }
        );
        assert!(RawComment::from_value(json!(["x"])).is_err());
        assert!(RawComment::from_value(json!({ "body": "x" })).is_err());
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("bagus banget");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("bagus banget"));
        assert_ne!(a, anon_hash("jelek"));
    }
}
