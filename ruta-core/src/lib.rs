pub mod clock;
pub mod keys;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::keys::SeatId;

/// Shared error taxonomy for the reservation core.
///
/// All four recoverable conditions carry enough structure for the calling
/// layer to render a precise message (conflicting seats, current status).
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Seats unavailable: {conflicting:?}")]
    SeatUnavailable { conflicting: Vec<SeatId> },

    #[error("Booking conflict, seats no longer held: {conflicting:?}")]
    BookingConflict { conflicting: Vec<SeatId> },

    #[error("Booking not cancellable: status {status}, {hours_to_departure:.1}h to departure")]
    NotCancellable {
        status: String,
        hours_to_departure: f64,
    },

    #[error("Inventory not found: schedule {schedule_id} on {journey_date}")]
    InventoryNotFound {
        schedule_id: Uuid,
        journey_date: NaiveDate,
    },

    #[error("Booking not found: {booking_id}")]
    BookingNotFound { booking_id: Uuid },

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
