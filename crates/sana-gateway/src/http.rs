//! The HTTP surface of the gateway.
//!
//! Routes mirror the mobile client's expectations:
//! `POST /api/chat/symptom-check`, `GET /api/chat/history/{session_id}`,
//! `GET /api/chat/sessions`, plus a `GET /api/` info route.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{TokenVerifier, bearer_token};
use crate::error::{Error, Result};
use crate::service::{ChatService, ExchangeReply};
use sana_store::{SessionSummary, TurnRecord};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    pub verifier: Arc<dyn TokenVerifier>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(api_info))
        .route("/api/chat/symptom-check", post(symptom_check))
        .route("/api/chat/history/{session_id}", get(chat_history))
        .route("/api/chat/sessions", get(chat_sessions))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Normally allocated client-side; the gateway allocates one itself for
    /// callers that omit it.
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TurnView {
    pub role: String,
    pub content: String,
    pub timestamp_ms: i64,
}

impl From<TurnRecord> for TurnView {
    fn from(turn: TurnRecord) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content,
            timestamp_ms: turn.created_at_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub created_at_ms: i64,
    pub message_count: i64,
    pub last_message: Option<String>,
}

impl From<SessionSummary> for SessionView {
    fn from(summary: SessionSummary) -> Self {
        Self {
            session_id: summary.session_id,
            created_at_ms: summary.created_at_ms,
            message_count: summary.turn_count,
            last_message: summary.last_turn,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<TurnView>,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionView>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn api_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Sana Health Companion API",
        "version": "1.0",
        "endpoints": [
            "/api/chat/symptom-check",
            "/api/chat/history/{session_id}",
            "/api/chat/sessions",
        ],
    }))
}

async fn symptom_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ExchangeReply>> {
    let user_id = authenticate(&state, &headers)?;
    let session_id = req.session_id.unwrap_or_else(allocate_session_id);

    let reply = state
        .service
        .exchange(&user_id, &session_id, &req.message)
        .await?;
    Ok(Json(reply))
}

async fn chat_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>> {
    let user_id = authenticate(&state, &headers)?;

    let turns = state.service.list_turns(&user_id, &session_id)?;
    Ok(Json(HistoryResponse {
        messages: turns.into_iter().map(TurnView::from).collect(),
    }))
}

async fn chat_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionsResponse>> {
    let user_id = authenticate(&state, &headers)?;

    let sessions = state.service.list_sessions(&user_id)?;
    Ok(Json(SessionsResponse {
        sessions: sessions.into_iter().map(SessionView::from).collect(),
    }))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String> {
    let token = bearer_token(headers).ok_or(Error::Unauthenticated)?;
    state.verifier.verify(token).ok_or(Error::Unauthenticated)
}

/// Fallback session id for requests that carry none. Same best-effort
/// uniqueness contract as the client-side allocator.
fn allocate_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("sess-{nanos}")
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
