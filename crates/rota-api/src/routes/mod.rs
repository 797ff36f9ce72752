//! HTTP route handlers.

pub mod bookings;
pub mod rooms;
pub mod schedule;
pub mod status;

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

/// `/api/v1` routes.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(status::routes())
        .merge(rooms::routes())
        .merge(bookings::routes())
        .merge(schedule::routes())
}
