use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::lexicon::LexiconStats;

// The recorder is process-global; tests may build several apps.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and describe the series.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("prometheus: install recorder")?;
                describe();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Static gauges describing the loaded lexicon.
    pub fn record_lexicon(&self, stats: &LexiconStats) {
        gauge!("lexicon_terms", "category" => "polarity").set(stats.polarity as f64);
        gauge!("lexicon_terms", "category" => "negator").set(stats.negators as f64);
        gauge!("lexicon_terms", "category" => "intensifier").set(stats.intensifiers as f64);
        gauge!("lexicon_terms", "category" => "diminisher").set(stats.diminishers as f64);
        gauge!("lexicon_terms", "category" => "slang").set(stats.slang as f64);
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!(
        "sentiment_comments_total",
        "Comments scored, labelled by sentiment"
    );
    describe_histogram!("sentiment_score", "Raw polarity score per comment");
    describe_counter!("sentiment_batches_total", "Batches analysed");
    describe_histogram!("sentiment_batch_ms", "Wall time per batch in milliseconds");
    describe_counter!(
        "sentiment_invalid_input_total",
        "Requests rejected because the comment text was not a string"
    );
    describe_gauge!("lexicon_terms", "Entries per lexicon category");
    describe_gauge!("sessions_stored", "Analysis sessions held in memory");
}
