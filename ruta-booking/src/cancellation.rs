use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ruta_core::clock::Clock;
use ruta_core::{Error, Result};
use ruta_inventory::InventoryStore;

use crate::models::{Booking, BookingStatus, Refund};
use crate::store::BookingStore;

/// One row of the refund table: bookings at least `min_hours` before
/// departure refund `percentage` of the total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RefundTier {
    pub min_hours: i64,
    pub percentage: u8,
}

/// Ordered payout table evaluated top-down. Both the cancellation gate
/// and the refund percentage derive from this one table, so the two can
/// never disagree on a threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundSchedule {
    tiers: Vec<RefundTier>,
}

impl RefundSchedule {
    pub fn new(mut tiers: Vec<RefundTier>) -> Self {
        tiers.sort_by(|a, b| b.min_hours.cmp(&a.min_hours));
        Self { tiers }
    }

    pub fn percentage_for(&self, hours_to_departure: f64) -> u8 {
        self.tiers
            .iter()
            .find(|tier| hours_to_departure >= tier.min_hours as f64)
            .map(|tier| tier.percentage)
            .unwrap_or(0)
    }

    /// The cancellation horizon: the smallest threshold that still pays
    /// anything. Below it, cancellation is disallowed outright.
    pub fn cancellable_from_hours(&self) -> i64 {
        self.tiers
            .iter()
            .filter(|tier| tier.percentage > 0)
            .map(|tier| tier.min_hours)
            .min()
            .unwrap_or(0)
    }
}

impl Default for RefundSchedule {
    fn default() -> Self {
        Self::new(vec![
            RefundTier {
                min_hours: 48,
                percentage: 90,
            },
            RefundTier {
                min_hours: 12,
                percentage: 25,
            },
        ])
    }
}

/// Governs the booking lifecycle after confirmation:
/// `confirmed -> {cancelled, completed}`, both terminal.
pub struct CancellationPolicy<I, B> {
    inventories: Arc<I>,
    bookings: Arc<B>,
    clock: Arc<dyn Clock>,
    schedule: RefundSchedule,
}

impl<I: InventoryStore, B: BookingStore> CancellationPolicy<I, B> {
    pub fn new(
        inventories: Arc<I>,
        bookings: Arc<B>,
        clock: Arc<dyn Clock>,
        schedule: RefundSchedule,
    ) -> Self {
        Self {
            inventories,
            bookings,
            clock,
            schedule,
        }
    }

    pub fn is_cancellable(&self, booking: &Booking, now: chrono::DateTime<chrono::Utc>) -> bool {
        booking.status == BookingStatus::Confirmed
            && booking.hours_to_departure(now)
                >= self.schedule.cancellable_from_hours() as f64
    }

    /// Pure payout calculation; rounds half-up to the cent.
    pub fn compute_refund(
        &self,
        booking: &Booking,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Refund {
        let percentage = self
            .schedule
            .percentage_for(booking.hours_to_departure(now));
        let amount_cents =
            (booking.fare.total_cents * percentage as i64 + 50) / 100;
        Refund {
            percentage,
            amount_cents,
            cancelled_at: now,
        }
    }

    /// Cancels a confirmed booking inside its row lock, stamps the refund
    /// and returns the seats to the available pool immediately.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<Booking> {
        let handle = self.bookings.get(booking_id).await?;
        let mut booking = handle.lock().await;
        let now = self.clock.now();

        if !self.is_cancellable(&booking, now) {
            return Err(Error::NotCancellable {
                status: booking.status.to_string(),
                hours_to_departure: booking.hours_to_departure(now),
            });
        }

        let refund = self.compute_refund(&booking, now);
        booking.refund = Some(refund.clone());
        booking.update_status(BookingStatus::Cancelled, now);

        let inventory = self.inventories.get(&booking.key()).await?;
        inventory.lock().await.release_booked(&booking.seats);

        info!(
            %booking_id,
            percentage = refund.percentage,
            amount_cents = refund.amount_cents,
            "booking cancelled, seats released"
        );
        Ok(booking.clone())
    }

    /// Time-driven transition: promotes confirmed bookings whose departure
    /// has passed to `completed`. Returns how many were promoted.
    pub async fn complete_departed(&self) -> Result<usize> {
        let mut completed = 0;
        for id in self.bookings.ids().await? {
            let handle = match self.bookings.get(id).await {
                Ok(handle) => handle,
                // Rolled back by a racing commit since the id scan.
                Err(Error::BookingNotFound { .. }) => continue,
                Err(err) => return Err(err),
            };
            let mut booking = handle.lock().await;
            let now = self.clock.now();
            if booking.status == BookingStatus::Confirmed && booking.departs_at <= now {
                booking.update_status(BookingStatus::Completed, now);
                completed += 1;
            }
        }
        if completed > 0 {
            info!(completed, "bookings past departure marked completed");
        }
        Ok(completed)
    }
}
