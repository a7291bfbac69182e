use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/refresh", post(handlers::refresh_form))
        .route("/auto-refresh/toggle", post(handlers::toggle_auto_refresh_form))
        .route("/api/week", get(handlers::get_week))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/auto-refresh", post(handlers::set_auto_refresh))
        .with_state(state)
}
