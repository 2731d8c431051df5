use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AskError;
use crate::models::{AskRequest, AskResponse};
use crate::state::AppState;

/// POST /api/ask - One full question/answer turn:
///   1. Validate the query (1-500 characters)
///   2. Classify into a structured intent (LLM call #1)
///   3. Compile predicates and dispatch across collections
///   4. Normalize and deduplicate the results
///   5. Synthesize the answer (LLM call #2), unless a short-circuit applied
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    let _permit = state
        .ask_semaphore
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Ask service at capacity".to_string(),
            )
        })?;

    match state.pipeline.answer(&req.query).await {
        Ok(response) => Ok(Json(response)),
        Err(AskError::Validation(reason)) => Err((StatusCode::BAD_REQUEST, reason)),
        Err(AskError::Store(e)) => {
            tracing::error!("document store failure: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ))
        }
        Err(AskError::Upstream(reason)) => {
            tracing::error!("upstream failure: {reason}");
            Err((
                StatusCode::BAD_GATEWAY,
                "The answer service is temporarily unavailable".to_string(),
            ))
        }
    }
}

/// GET /healthz - liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}
