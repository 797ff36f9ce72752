//! Week schedule route.
//!
//! ## Routes
//!
//! - `GET /schedule` - Classified slot grid for one week across all rooms

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use rota_ledger::WeekSchedule;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// Week selection query.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleQuery {
    /// Any date inside the requested week. Defaults to the current week.
    pub week_of: Option<NaiveDate>,
}

/// Creates schedule routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/schedule", get(get_schedule))
}

/// Get the classified slot grid for a week.
///
/// GET /api/v1/schedule?week_of=YYYY-MM-DD
#[utoipa::path(
    get,
    path = "/api/v1/schedule",
    tag = "schedule",
    params(
        ("week_of" = Option<String>, Query, description = "Any date inside the requested week (YYYY-MM-DD); defaults to the current week"),
    ),
    responses(
        (status = 200, description = "Week schedule computed", body = WeekSchedule),
        (status = 400, description = "Malformed date", body = ApiErrorBody),
        (status = 503, description = "Store unavailable", body = ApiErrorBody),
    )
)]
pub(crate) async fn get_schedule(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let week_of = query
        .week_of
        .unwrap_or_else(|| state.reader.status().current_week.window.week_start);

    tracing::debug!(
        request_id = %ctx.request_id,
        week_of = %week_of,
        "Computing week schedule"
    );

    let schedule = state
        .reader
        .week_schedule(week_of)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    Ok(Json(schedule))
}
