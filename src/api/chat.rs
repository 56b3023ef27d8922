//! Chat and roleplay endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::responder::{ChatRequest, HistoryEntry, RoleplayRequest, ScenarioRef};

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/roleplay", post(roleplay))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RoleplayBody {
    pub scenario: Option<ScenarioRef>,
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Reply returned by both endpoints
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub response: String,
}

async fn chat(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let Json(body) = body?;

    let message = body
        .message
        .filter(|m| !m.is_empty())
        .ok_or(ApiError::BadRequest("Message is required"))?;

    let request = ChatRequest {
        message,
        history: body.history,
    };

    let response = state.responder.chat(&request).await.map_err(|e| {
        tracing::error!(error = %e, "chat responder failed");
        ApiError::Internal
    })?;

    Ok(Json(ReplyResponse { response }))
}

async fn roleplay(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<RoleplayBody>, JsonRejection>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let Json(body) = body?;

    let (Some(scenario), Some(message)) = (body.scenario, body.message.filter(|m| !m.is_empty()))
    else {
        return Err(ApiError::BadRequest("Scenario and message are required"));
    };

    tracing::debug!(scenario = %scenario.id, "roleplay request");
    let request = RoleplayRequest {
        scenario,
        message,
        history: body.history,
    };

    let response = state.responder.roleplay(&request).await.map_err(|e| {
        tracing::error!(error = %e, "roleplay responder failed");
        ApiError::Internal
    })?;

    Ok(Json(ReplyResponse { response }))
}
