use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ruta_core::keys::{InventoryKey, SeatId, SessionToken};

use crate::fare::FareBreakdown;

/// Booking lifecycle. `Cancelled` and `Completed` are terminal;
/// `Completed` is reached by the time-driven sweep once departure passes,
/// never by a user action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    /// Free-form contact details (phone, email, ...).
    pub contact: serde_json::Value,
}

/// Refund stamped onto a booking at cancellation, reproducible from the
/// stored fare breakdown and the tier table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Refund {
    pub percentage: u8,
    pub amount_cents: i64,
    pub cancelled_at: DateTime<Utc>,
}

/// A confirmed sale. Seat set and fare are immutable after creation;
/// status (and the refund record it implies) is the only later mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub journey_date: NaiveDate,
    pub seats: Vec<SeatId>,
    pub passenger: Passenger,
    pub session: SessionToken,
    pub fare: FareBreakdown,
    pub status: BookingStatus,
    pub departs_at: DateTime<Utc>,
    pub refund: Option<Refund>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        key: InventoryKey,
        seats: Vec<SeatId>,
        passenger: Passenger,
        session: SessionToken,
        fare: FareBreakdown,
        departs_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            schedule_id: key.schedule_id,
            journey_date: key.journey_date,
            seats,
            passenger,
            session,
            fare,
            status: BookingStatus::Confirmed,
            departs_at,
            refund: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> InventoryKey {
        InventoryKey::new(self.schedule_id, self.journey_date)
    }

    pub fn update_status(&mut self, new_status: BookingStatus, now: DateTime<Utc>) {
        self.status = new_status;
        self.updated_at = now;
    }

    pub fn hours_to_departure(&self, now: DateTime<Utc>) -> f64 {
        (self.departs_at - now).num_minutes() as f64 / 60.0
    }
}
