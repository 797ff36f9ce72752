//! Room catalog route.
//!
//! ## Routes
//!
//! - `GET /rooms` - List the bookable rooms

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use rota_core::model::Room;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// List rooms response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListRoomsResponse {
    /// The bookable rooms, in catalog order.
    pub rooms: Vec<Room>,
}

/// Creates room routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/rooms", get(list_rooms))
}

/// List the bookable rooms.
///
/// GET /api/v1/rooms
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "rooms",
    responses(
        (status = 200, description = "Rooms listed", body = ListRoomsResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorBody),
    )
)]
pub(crate) async fn list_rooms(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(request_id = %ctx.request_id, "Listing rooms");

    let rooms = state
        .reader
        .rooms()
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    Ok(Json(ListRoomsResponse { rooms }))
}
