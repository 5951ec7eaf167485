use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::ContextError;
use crate::models::{CachedRepo, ContextRequest, ContextResponse, StatsResponse};
use crate::state::AppState;

/// POST /api/context - Most relevant files of a repository for a question
pub async fn get_context(
    State(state): State<AppState>,
    Json(req): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, Response> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()).into_response());
    }

    let excerpts = state
        .engine
        .get_context(&req.repo, query)
        .await
        .map_err(error_response)?;

    Ok(Json(ContextResponse {
        repo: req.repo.trim().to_string(),
        excerpts,
    }))
}

/// GET /api/stats - Cache residency and rate window usage
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = &state.engine;
    let cached_repos = engine
        .resident()
        .into_iter()
        .map(|r| CachedRepo {
            repo: r.key.to_string(),
            file_count: r.entry.len(),
            built_at: r.built_at,
        })
        .collect::<Vec<_>>();

    Json(StatsResponse {
        cache_size: engine.cache_size(),
        cache_capacity: engine.cache_capacity(),
        cached_repos,
        rate_window_used: engine.rate_window_used(),
        rate_limit: engine.rate_limit(),
    })
}

pub fn status_for(err: &ContextError) -> StatusCode {
    match err {
        ContextError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        ContextError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ContextError::RepoNotFound(_) => StatusCode::NOT_FOUND,
        ContextError::NoEligibleFiles(_) | ContextError::NoContentLoaded(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ContextError::TreeUnavailable(_) | ContextError::EmbeddingUnavailable(_) => {
            StatusCode::BAD_GATEWAY
        }
        ContextError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ContextError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ContextError) -> Response {
    let status = status_for(&err);
    match err {
        ContextError::RateLimited { retry_after_secs } => (
            status,
            [(header::RETRY_AFTER, retry_after_secs.to_string())],
            err.to_string(),
        )
            .into_response(),
        _ => (status, err.to_string()).into_response(),
    }
}
