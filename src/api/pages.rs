//! HTML chat pages.
//!
//! Each request ends in exactly one explicit render of the session.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use uuid::Uuid;

use super::error::ApiError;
use super::routes::AppState;
use super::types::ChatForm;
use crate::credential::Credential;
use crate::ui::{BusyPage, ChatPage};

/// Start a fresh session and send the browser to it.
pub async fn start(State(state): State<Arc<AppState>>) -> Redirect {
    let (id, _) = state.sessions.create().await;
    Redirect::to(&format!("/chat/{}", id))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let Some(handle) = state.sessions.get(id).await else {
        // Expired or ended; start over
        return Ok(Redirect::to("/").into_response());
    };
    let Ok(session) = handle.try_lock() else {
        return busy(&state, id);
    };

    let html = state
        .pages
        .render_chat(&ChatPage::new(&session, state.submit_mode, ""))?;
    Ok(Html(html).into_response())
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let Some(handle) = state.sessions.get(id).await else {
        return Ok(Redirect::to("/").into_response());
    };
    let Ok(mut session) = handle.try_lock() else {
        return busy(&state, id);
    };

    session
        .submit(
            &state.agent,
            &form.prompt,
            Credential::from_input(&form.api_key),
            state.default_api_key.as_ref(),
        )
        .await;

    let html = state
        .pages
        .render_chat(&ChatPage::new(&session, state.submit_mode, &form.prompt))?;
    Ok(Html(html).into_response())
}

/// Dispose of the session and start a new one.
pub async fn end(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Redirect {
    state.sessions.remove(id).await;
    Redirect::to("/")
}

/// Retry page for a session that is still running a turn.
fn busy(state: &AppState, id: Uuid) -> Result<Response, ApiError> {
    let html = state.pages.render_busy(&BusyPage { session_id: id })?;
    Ok((StatusCode::CONFLICT, Html(html)).into_response())
}
