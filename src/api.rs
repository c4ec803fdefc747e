use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::batch::BatchReport;
use crate::error::InvalidInputError;
use crate::history::{SessionStore, SessionSummary};
use crate::sentiment::{RawComment, SentimentAnalyzer, SentimentResult};

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 500;
/// Batches at least this large are split across worker threads.
const PARALLEL_MIN: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SentimentAnalyzer>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(analyzer: SentimentAnalyzer, sessions: SessionStore) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            sessions: Arc::new(sessions),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    InvalidInput {
        index: Option<usize>,
        source: InvalidInputError,
    },
    NotFound(u64),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidInput { index, source } => {
                counter!("sentiment_invalid_input_total").increment(1);
                let mut body = json!({ "error": source.to_string() });
                if let Some(i) = index {
                    body["index"] = json!(i);
                }
                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("session {id} not found") }),
            ),
            ApiError::Internal(e) => {
                warn!(target: "api", error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<SentimentResult>, ApiError> {
    let comment =
        RawComment::from_value(body).map_err(|source| ApiError::InvalidInput { index: None, source })?;
    Ok(Json(state.analyzer.analyze_comment(comment)))
}

#[derive(Deserialize)]
struct BatchReq {
    #[serde(default)]
    keyword: Option<String>,
    comments: Vec<Value>,
}

#[derive(Serialize)]
struct BatchResp {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<u64>,
    results: Vec<SentimentResult>,
    report: BatchReport,
}

async fn analyze_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchReq>,
) -> Result<Json<BatchResp>, ApiError> {
    let comments = body
        .comments
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            RawComment::from_value(v).map_err(|source| ApiError::InvalidInput {
                index: Some(i),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let t0 = Instant::now();
    let analyzer = state.analyzer.clone();
    let batch = tokio::task::spawn_blocking(move || {
        if comments.len() >= PARALLEL_MIN {
            let workers = analyzer.config().batch.workers;
            analyzer.analyze_batch_parallel(comments, workers)
        } else {
            analyzer.analyze_batch(comments)
        }
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))?;
    histogram!("sentiment_batch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("sentiment_batches_total").increment(1);

    let report = batch.report(state.analyzer.lexicon(), &state.analyzer.config().batch);
    info!(
        target: "api",
        comments = batch.len(),
        positive = report.summary.positive_count,
        negative = report.summary.negative_count,
        neutral = report.summary.neutral_count,
        "batch analysed"
    );

    let keyword = body.keyword.filter(|k| !k.trim().is_empty());
    let (session_id, results) = match keyword {
        Some(k) => {
            let results = batch.results.clone();
            let id = state.sessions.record(&k, batch);
            persist(&state).await;
            (Some(id), results)
        }
        None => (None, batch.results),
    };

    Ok(Json(BatchResp {
        session_id,
        results,
        report,
    }))
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Json<Vec<SessionSummary>> {
    let limit = q.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    Json(state.sessions.list(limit))
}

#[derive(Serialize)]
struct SessionDetail {
    id: u64,
    keyword: String,
    created_at: DateTime<Utc>,
    results: Vec<SentimentResult>,
    report: BatchReport,
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SessionDetail>, ApiError> {
    let session = state.sessions.get(id).ok_or(ApiError::NotFound(id))?;
    let report = session
        .batch
        .report(state.analyzer.lexicon(), &state.analyzer.config().batch);
    Ok(Json(SessionDetail {
        id: session.id,
        keyword: session.keyword,
        created_at: session.created_at,
        results: session.batch.results,
        report,
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    if !state.sessions.delete(id) {
        return Err(ApiError::NotFound(id));
    }
    persist(&state).await;
    Ok(StatusCode::NO_CONTENT)
}

// Snapshot failures are logged, the request still succeeds.
async fn persist(state: &AppState) {
    gauge!("sessions_stored").set(state.sessions.len() as f64);
    let Some(path) = state.analyzer.config().history.snapshot_path.clone() else {
        return;
    };
    let sessions = state.sessions.clone();
    let shown = path.display().to_string();
    match tokio::task::spawn_blocking(move || sessions.save_json(&path)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(target: "api", error = ?e, path = %shown, "session snapshot failed"),
        Err(e) => warn!(target: "api", error = %e, path = %shown, "session snapshot task failed"),
    }
}
