// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod lexicon;
pub mod metrics;
pub mod normalize;
pub mod scorer;
pub mod sentiment;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::batch::{AnalysisBatch, BatchReport, BatchSummary};
pub use crate::classifier::{Classifier, Label};
pub use crate::config::AnalyzerConfig;
pub use crate::error::{InvalidInputError, LexiconLoadError};
pub use crate::lexicon::LexiconStore;
pub use crate::normalize::Normalizer;
pub use crate::scorer::PolarityScorer;
pub use crate::sentiment::{RawComment, SentimentAnalyzer, SentimentResult};

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::{error, info};

use crate::history::SessionStore;
use crate::metrics::Metrics;

/// Build the full application router (API + `/metrics`) from a resolved config.
///
/// A lexicon that fails to load is fatal: the error category is logged and
/// returned, there is no fallback lexicon.
pub fn app(config: AnalyzerConfig) -> anyhow::Result<Router> {
    let lexicon = match LexiconStore::load(&config.lexicon.path) {
        Ok(l) => l,
        Err(e) => {
            error!(
                target: "lexicon",
                category = e.category(),
                error = %e,
                "lexicon failed to load; refusing to start"
            );
            return Err(e).with_context(|| {
                format!("loading lexicon from {}", config.lexicon.path.display())
            });
        }
    };

    let metrics = Metrics::init()?;
    metrics.record_lexicon(&lexicon.stats());

    let sessions = SessionStore::from_config(&config.history)?;
    info!(
        target: "app",
        lexicon = %config.lexicon.path.display(),
        threshold = config.classifier.threshold,
        window = config.scorer.window,
        sessions = sessions.len(),
        "analyzer ready"
    );

    let state = AppState {
        analyzer: Arc::new(SentimentAnalyzer::new(Arc::new(lexicon), config)),
        sessions: Arc::new(sessions),
    };
    Ok(create_router(state).merge(metrics.router()))
}
