//! Post-commit notification seam.
//!
//! After a successful commit the writer hands the booking to a
//! [`BookingNotifier`]. The stock implementation emits a structured log
//! event carrying only non-sensitive fields; the requester email never
//! appears in log output. Notifier failures are logged by the writer and
//! never fail the transaction.

use async_trait::async_trait;

use rota_core::error::Result;
use rota_core::model::Booking;

/// Receives successful bookings after commit.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    /// Called once per committed booking.
    async fn booking_committed(&self, booking: &Booking) -> Result<()>;
}

/// Notifier that emits a structured confirmation log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl BookingNotifier for LogNotifier {
    async fn booking_committed(&self, booking: &Booking) -> Result<()> {
        tracing::info!(
            booking_id = %booking.id,
            slot_count = booking.slots.len(),
            user = %booking.requester.user_name,
            coordinator = %booking.requester.coordinator_name,
            "Booking confirmed"
        );
        Ok(())
    }
}

/// Notifier that does nothing. Test use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl BookingNotifier for NoopNotifier {
    async fn booking_committed(&self, _booking: &Booking) -> Result<()> {
        Ok(())
    }
}
