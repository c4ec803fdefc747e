//! Indonesian comment sentiment service: binary entrypoint.
//! Boots the Axum HTTP server with the lexicon, session store and metrics wired in.

use indo_sentiment_analyzer::{app, AnalyzerConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs; `RUST_LOG` overrides the default filter.
/// Shuttle may already have installed a subscriber, so this never panics.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lexicon=info,sentiment=warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AnalyzerConfig::from_env()?;
    let router = app(config)?;

    Ok(router.into())
}
