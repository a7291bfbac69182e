use crate::errors::AppError;
use crate::models::{AutoRefreshRequest, BoardView};
use crate::state::{AppState, RefreshOutcome};
use crate::ui::render_index;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
};
use chrono::Utc;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let view = state.snapshot().await;
    Ok(Html(render_index(&view, state.app_version, Utc::now())?))
}

pub async fn get_week(State(state): State<AppState>) -> Json<BoardView> {
    Json(state.snapshot().await)
}

pub async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<BoardView>) {
    let status = match state.request_refresh().await {
        RefreshOutcome::Queued | RefreshOutcome::Skipped => StatusCode::ACCEPTED,
        RefreshOutcome::Updated | RefreshOutcome::Failed => StatusCode::OK,
    };
    (status, Json(state.snapshot().await))
}

pub async fn set_auto_refresh(
    State(state): State<AppState>,
    Json(payload): Json<AutoRefreshRequest>,
) -> Json<BoardView> {
    let switched_on = state.set_auto_refresh(payload.enabled).await;
    refresh_if_switched_on(&state, switched_on);
    Json(state.snapshot().await)
}

pub async fn refresh_form(State(state): State<AppState>) -> Redirect {
    state.request_refresh().await;
    Redirect::to("/")
}

pub async fn toggle_auto_refresh_form(State(state): State<AppState>) -> Redirect {
    let switched_on = state.toggle_auto_refresh().await;
    refresh_if_switched_on(&state, switched_on);
    Redirect::to("/")
}

// Turning auto refresh on loads fresh data right away.
fn refresh_if_switched_on(state: &AppState, switched_on: bool) {
    if switched_on {
        let state = state.clone();
        tokio::spawn(async move {
            state.refresh_if_idle().await;
        });
    }
}
