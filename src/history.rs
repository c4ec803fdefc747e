//! history.rs: in-memory store of analysis sessions (keyword + scored batch),
//! with JSON snapshots so a run can be reloaded later.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::batch::{AnalysisBatch, BatchSummary};

pub const DEFAULT_CAPACITY: usize = 200;
const MAX_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    /// Where sessions are snapshotted after each change; `None` keeps them in memory only.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            snapshot_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub id: u64,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
    pub batch: AnalysisBatch,
}

/// Listing row: session without the per-comment results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: u64,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
    pub summary: BatchSummary,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    sessions: Vec<AnalysisSession>,
}

#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<Snapshot>,
    // held for a whole snapshot write; one writer owns the temp file at a time
    save: Mutex<()>,
    cap: usize,
}

impl SessionStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            inner: Mutex::new(Snapshot {
                next_id: 1,
                sessions: Vec::with_capacity(cap.min(64)),
            }),
            save: Mutex::new(()),
            cap,
        }
    }

    /// Store a finished batch; the oldest sessions are evicted past capacity.
    pub fn record(&self, keyword: &str, batch: AnalysisBatch) -> u64 {
        let mut s = self.inner.lock().expect("session store mutex poisoned");
        let id = s.next_id;
        s.next_id += 1;
        s.sessions.push(AnalysisSession {
            id,
            keyword: keyword.trim().to_string(),
            created_at: Utc::now(),
            batch,
        });
        if s.sessions.len() > self.cap {
            let excess = s.sessions.len() - self.cap;
            s.sessions.drain(0..excess);
        }
        id
    }

    /// Newest first.
    pub fn list(&self, limit: usize) -> Vec<SessionSummary> {
        let s = self.inner.lock().expect("session store mutex poisoned");
        s.sessions
            .iter()
            .rev()
            .take(limit)
            .map(|sess| SessionSummary {
                id: sess.id,
                keyword: sess.keyword.clone(),
                created_at: sess.created_at,
                summary: sess.batch.summary(),
            })
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<AnalysisSession> {
        let s = self.inner.lock().expect("session store mutex poisoned");
        s.sessions.iter().find(|sess| sess.id == id).cloned()
    }

    pub fn delete(&self, id: u64) -> bool {
        let mut s = self.inner.lock().expect("session store mutex poisoned");
        let before = s.sessions.len();
        s.sessions.retain(|sess| sess.id != id);
        s.sessions.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("session store mutex poisoned")
            .sessions
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write all sessions as JSON (temp file + rename). Concurrent calls are
    /// serialized and each writes the state current when it got its turn.
    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        let _writer = self.save.lock().expect("snapshot writer mutex poisoned");
        let json = {
            let s = self.inner.lock().expect("session store mutex poisoned");
            serde_json::to_vec_pretty(&*s).context("serializing sessions")?
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating snapshot dir {}", dir.display()))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    /// Load a snapshot written by [`SessionStore::save_json`].
    pub fn load_json(path: &Path, cap: usize) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading sessions from {}", path.display()))?;
        let mut snap: Snapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing sessions from {}", path.display()))?;

        let store = Self::with_capacity(cap);
        if snap.sessions.len() > store.cap {
            let excess = snap.sessions.len() - store.cap;
            snap.sessions.drain(0..excess);
        }
        let max_id = snap.sessions.iter().map(|s| s.id).max().unwrap_or(0);
        snap.next_id = snap.next_id.max(max_id + 1);
        info!(target: "history", path = %path.display(), sessions = snap.sessions.len(), "sessions loaded");
        *store.inner.lock().expect("session store mutex poisoned") = snap;
        Ok(store)
    }

    /// Load the configured snapshot if it exists, otherwise start empty.
    pub fn from_config(cfg: &HistoryConfig) -> anyhow::Result<Self> {
        match &cfg.snapshot_path {
            Some(p) if p.exists() => Self::load_json(p, cfg.capacity),
            _ => Ok(Self::with_capacity(cfg.capacity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Label;
    use crate::sentiment::SentimentResult;

    fn batch(scores: &[(f64, Label)]) -> AnalysisBatch {
        AnalysisBatch::new(
            scores
                .iter()
                .map(|&(score, label)| SentimentResult {
                    raw_text: String::new(),
                    normalized_tokens: Vec::new(),
                    score,
                    label,
                    matched_terms: Vec::new(),
                    metadata: Default::default(),
                })
                .collect(),
        )
    }

    #[test]
    fn record_list_get_delete() {
        let store = SessionStore::with_capacity(10);
        let a = store.record(" skincare ", batch(&[(1.0, Label::Positive)]));
        let b = store.record("hp murah", batch(&[(-1.0, Label::Negative)]));
        assert!(b > a);

        let rows = store.list(10);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(rows[1].keyword, "skincare");
        assert_eq!(rows[0].summary.negative_count, 1);

        assert_eq!(store.get(a).unwrap().batch.len(), 1);
        assert!(store.delete(a));
        assert!(!store.delete(a));
        assert!(store.get(a).is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = SessionStore::with_capacity(2);
        let first = store.record("a", AnalysisBatch::default());
        store.record("b", AnalysisBatch::default());
        store.record("c", AnalysisBatch::default());
        assert_eq!(store.len(), 2);
        assert!(store.get(first).is_none());
    }
}
