//! `OpenAPI` (3.1) document generation for `rota-api`.
//!
//! `cargo xtask openapi` (or the `gen_openapi` binary directly) emits the
//! document for external clients and for breaking-change detection in CI.

use utoipa::OpenApi;

/// `OpenAPI` documentation for the Rota REST API (`/api/v1/*`).
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rota API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Lab room reservation REST API"
    ),
    paths(
        crate::routes::status::get_status,
        crate::routes::rooms::list_rooms,
        crate::routes::bookings::create_booking,
        crate::routes::bookings::list_bookings,
        crate::routes::schedule::get_schedule,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::routes::rooms::ListRoomsResponse,
            crate::routes::bookings::CreateBookingRequest,
            crate::routes::bookings::ListBookingsResponse,
            rota_core::window::AdmissionWindow,
            rota_core::window::WeekStatus,
            rota_core::window::WindowStatus,
            rota_core::model::Room,
            rota_core::model::Period,
            rota_core::model::Slot,
            rota_core::model::Requester,
            rota_core::model::Booking,
            rota_core::classify::SlotState,
            rota_core::classify::ClassifiedSlot,
            rota_ledger::reader::RoomSchedule,
            rota_ledger::reader::WeekSchedule,
        )
    ),
    tags(
        (name = "status", description = "Admission window status"),
        (name = "rooms", description = "Room catalog"),
        (name = "bookings", description = "Reservation submission and queries"),
        (name = "schedule", description = "Classified week schedules"),
    ),
)]
pub struct ApiDoc;

/// Returns the generated `OpenAPI` spec.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Returns the generated `OpenAPI` spec serialized as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen).
pub fn openapi_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec = openapi();
        let paths: Vec<_> = spec.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/api/v1/status".to_string()));
        assert!(paths.contains(&"/api/v1/rooms".to_string()));
        assert!(paths.contains(&"/api/v1/bookings".to_string()));
        assert!(paths.contains(&"/api/v1/schedule".to_string()));
    }

    #[test]
    fn test_spec_serializes_to_json() {
        let json = openapi_json().unwrap();
        assert!(json.contains("Rota API"));
        assert!(json.contains("CreateBookingRequest"));
    }
}
