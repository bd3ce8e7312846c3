//! JSON endpoints over the session operations.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::error::ApiError;
use super::routes::AppState;
use super::types::{
    CreateSessionResponse, HealthResponse, SessionView, SubmitMessageRequest,
    SubmitMessageResponse,
};
use crate::credential::Credential;
use crate::session::TurnOutcome;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.len().await,
    })
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let (id, handle) = state.sessions.create().await;
    let messages = handle.lock().await.messages().to_vec();
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { id, messages }),
    )
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    let session = handle.try_lock().map_err(|_| ApiError::TurnInProgress(id))?;
    Ok(Json(SessionView::from(&*session)))
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

pub async fn submit_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitMessageRequest>,
) -> Result<Json<SubmitMessageResponse>, ApiError> {
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    let mut session = handle.try_lock().map_err(|_| ApiError::TurnInProgress(id))?;

    let entered_key = req.api_key.as_deref().and_then(Credential::from_input);
    let outcome = session
        .submit(
            &state.agent,
            &req.content,
            entered_key,
            state.default_api_key.as_ref(),
        )
        .await;

    let messages = session.messages().to_vec();
    let reply = match outcome {
        TurnOutcome::Ignored => None,
        _ => messages.last().cloned(),
    };

    Ok(Json(SubmitMessageResponse {
        outcome,
        reply,
        messages,
    }))
}
