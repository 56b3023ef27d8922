//! Translation endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::responder::TranslateRequest;

/// Build translate router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/translate", post(translate))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
    pub text: Option<String>,
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
}

/// Translate via the responder tables; unknown phrases come back unchanged
async fn translate(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(body) = body?;

    let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
    let (Some(text), Some(target_language)) = (non_empty(body.text), non_empty(body.target_language))
    else {
        return Err(ApiError::BadRequest("Text and target language are required"));
    };

    let request = TranslateRequest {
        text,
        target_language,
    };

    let translation = state.responder.translate(&request).await.map_err(|e| {
        tracing::error!(error = %e, "translate responder failed");
        ApiError::Internal
    })?;

    Ok(Json(TranslateResponse { translation }))
}
