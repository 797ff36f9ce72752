//! Admission window status route.
//!
//! ## Routes
//!
//! - `GET /status` - Window state for the current and next week

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use rota_core::window::WindowStatus;

use crate::error::ApiErrorBody;
use crate::server::AppState;

/// Creates status routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// Get the admission window status.
///
/// GET /api/v1/status
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "status",
    responses(
        (status = 200, description = "Window status computed", body = WindowStatus),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.reader.status())
}
