//! Booking API routes.
//!
//! ## Routes
//!
//! - `POST /bookings` - Submit a reservation batch
//! - `GET  /bookings` - List bookings with a slot in a date range

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use rota_core::model::{Booking, Requester, Slot};

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// Request to submit a reservation batch.
#[derive(Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// The slots to book, one to three, no duplicates.
    pub slots: Vec<Slot>,
    /// Name of the person the booking is for.
    pub user_name: String,
    /// Contact email for the confirmation.
    pub user_email: String,
    /// Name of the coordinating supervisor.
    pub coordinator_name: String,
}

impl std::fmt::Debug for CreateBookingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateBookingRequest")
            .field("slots", &self.slots)
            .field("user_name", &self.user_name)
            .field("user_email", &"[REDACTED]")
            .field("coordinator_name", &self.coordinator_name)
            .finish()
    }
}

/// Date range query for listing bookings. Both bounds are inclusive.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RangeQuery {
    /// First date of the range.
    pub start_date: NaiveDate,
    /// Last date of the range.
    pub end_date: NaiveDate,
}

/// List bookings response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListBookingsResponse {
    /// Bookings with at least one slot in the range.
    pub bookings: Vec<Booking>,
}

/// Creates booking routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/bookings", post(create_booking).get(list_bookings))
}

/// Submit a reservation batch.
///
/// POST /api/v1/bookings
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Reservation committed", body = Booking),
        (status = 400, description = "Malformed batch or requester", body = ApiErrorBody),
        (status = 422, description = "Slot outside the bookable calendar", body = ApiErrorBody),
        (status = 409, description = "Slot already booked", body = ApiErrorBody),
        (status = 503, description = "Busy or store unavailable", body = ApiErrorBody),
    )
)]
pub(crate) async fn create_booking(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        request_id = %ctx.request_id,
        slot_count = req.slots.len(),
        user = %req.user_name,
        "Submitting reservation"
    );

    let requester = Requester {
        user_name: req.user_name,
        user_email: req.user_email,
        coordinator_name: req.coordinator_name,
    };

    let booking = state
        .writer
        .submit(req.slots, requester)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings with at least one slot in the range.
///
/// GET /api/v1/bookings?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "bookings",
    params(
        ("start_date" = String, Query, description = "First date of the range (YYYY-MM-DD)"),
        ("end_date" = String, Query, description = "Last date of the range (YYYY-MM-DD)"),
    ),
    responses(
        (status = 200, description = "Bookings listed", body = ListBookingsResponse),
        (status = 400, description = "Inverted or malformed range", body = ApiErrorBody),
        (status = 503, description = "Store unavailable", body = ApiErrorBody),
    )
)]
pub(crate) async fn list_bookings(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(
        request_id = %ctx.request_id,
        start_date = %range.start_date,
        end_date = %range.end_date,
        "Listing bookings"
    );

    let bookings = state
        .reader
        .bookings_in_range(range.start_date, range.end_date)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    Ok(Json(ListBookingsResponse { bookings }))
}
