//! Comment sources. Fetching from video platforms lives outside this crate;
//! anything that can hand over `{text, ...}` objects plugs in here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use metrics::counter;
use serde_json::Value;
use tracing::{info, warn};

use crate::sentiment::RawComment;

#[async_trait::async_trait]
pub trait CommentSource {
    /// Up to `limit` comments for `keyword`. An empty keyword means "everything".
    async fn fetch(&self, keyword: &str, limit: usize) -> Result<Vec<RawComment>>;
    fn name(&self) -> &'static str;
}

/// Reads a JSON array of comment objects from disk, e.g. a scraper export.
///
/// Entries whose `text` is not a string are skipped with a warning. When a
/// keyword is given, only comments containing it (case-insensitive) are kept.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse_str(s: &str, keyword: &str, limit: usize) -> Result<Vec<RawComment>> {
        let items: Vec<Value> = serde_json::from_str(s).context("comments: expected a JSON array")?;
        let needle = keyword.trim().to_lowercase();

        let mut out = Vec::with_capacity(items.len().min(limit));
        let mut skipped = 0usize;
        for (idx, item) in items.into_iter().enumerate() {
            if out.len() >= limit {
                break;
            }
            let comment = match RawComment::from_value(item) {
                Ok(c) => c,
                Err(e) => {
                    warn!(target: "source", idx, error = %e, "skipping comment");
                    skipped += 1;
                    continue;
                }
            };
            if needle.is_empty() || comment.text.to_lowercase().contains(&needle) {
                out.push(comment);
            }
        }
        if skipped > 0 {
            counter!("sentiment_invalid_input_total").increment(skipped as u64);
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl CommentSource for JsonFileSource {
    async fn fetch(&self, keyword: &str, limit: usize) -> Result<Vec<RawComment>> {
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading comments from {}", self.path.display()))?;
        let out = Self::parse_str(&data, keyword, limit)?;
        info!(target: "source", source = self.name(), count = out.len(), "comments fetched");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"[
        {"text": "Produknya bagus banget", "username": "a"},
        {"text": 12},
        {"text": "pengiriman lama", "username": "b"},
        {"text": "BAGUS sih"}
    ]"#;

    #[test]
    fn parse_skips_invalid_and_filters_keyword() {
        let all = JsonFileSource::parse_str(DUMP, "", 100).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].metadata["username"], "a");

        let bagus = JsonFileSource::parse_str(DUMP, "bagus", 100).unwrap();
        assert_eq!(bagus.len(), 2);

        let one = JsonFileSource::parse_str(DUMP, "", 1).unwrap();
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(JsonFileSource::parse_str(r#"{"text": "x"}"#, "", 10).is_err());
    }

    #[tokio::test]
    async fn fetch_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.json");
        std::fs::write(&path, DUMP).unwrap();
        let src = JsonFileSource::new(&path);
        let got = src.fetch("lama", 10).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(src.name(), "json-file");

        let missing = JsonFileSource::new(dir.path().join("nope.json"));
        assert!(missing.fetch("", 10).await.is_err());
    }
}
