//! Score a JSON dump of comments and print the batch report.
//!
//! Usage: `analyze-comments <comments.json> [keyword]`
//!
//! The file is a JSON array of `{ "text": ..., ... }` objects. With a keyword,
//! only comments containing it are analysed. Logs go to stderr, the report to stdout.

use anyhow::{bail, Context};
use indo_sentiment_analyzer::source::{CommentSource, JsonFileSource};
use indo_sentiment_analyzer::{AnalyzerConfig, SentimentAnalyzer};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: analyze-comments <comments.json> [keyword]");
    };
    let keyword = args.next().unwrap_or_default();

    let config = AnalyzerConfig::from_env()?;
    let workers = config.batch.workers;
    let analyzer = SentimentAnalyzer::from_config(config).context("loading lexicon")?;

    let source = JsonFileSource::new(&path);
    let comments = source.fetch(&keyword, usize::MAX).await?;
    info!(source = source.name(), count = comments.len(), "comments loaded");

    let batch = analyzer.analyze_batch_parallel(comments, workers);
    let report = batch.report(analyzer.lexicon(), &analyzer.config().batch);

    let out = json!({
        "keyword": keyword,
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
