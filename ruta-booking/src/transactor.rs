use std::sync::Arc;
use tracing::{info, warn};

use ruta_core::clock::Clock;
use ruta_core::keys::{InventoryKey, SeatId, SessionToken};
use ruta_core::{Error, Result};
use ruta_inventory::InventoryStore;

use crate::fare::FareSchedule;
use crate::models::{Booking, BookingStatus, Passenger};
use crate::store::BookingStore;

/// How often an idempotent read is re-attempted on a transient store
/// failure. Writes are never retried automatically; a failed write rolls
/// back and surfaces, else a retry could double-book.
const READ_RETRIES: usize = 2;

async fn read_with_retry<T, F, Fut>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempts = 0;
    loop {
        match op().await {
            Err(Error::Store(reason)) if attempts < READ_RETRIES => {
                attempts += 1;
                warn!(%reason, attempts, "transient store read failure, retrying");
            }
            outcome => return outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub key: InventoryKey,
    pub seats: Vec<SeatId>,
    pub session: SessionToken,
    pub passenger: Passenger,
    pub fare_per_seat_cents: i64,
}

/// The single atomic boundary that turns a soft hold into a sale.
///
/// The whole commit runs inside the inventory unit's critical section:
/// hold re-validation, booking persistence, the seat-booked write and the
/// lock release cannot interleave with a racing acquire or commit on the
/// same unit.
pub struct BookingTransactor<I, B> {
    inventories: Arc<I>,
    bookings: Arc<B>,
    clock: Arc<dyn Clock>,
    fares: FareSchedule,
}

impl<I: InventoryStore, B: BookingStore> BookingTransactor<I, B> {
    pub fn new(
        inventories: Arc<I>,
        bookings: Arc<B>,
        clock: Arc<dyn Clock>,
        fares: FareSchedule,
    ) -> Self {
        Self {
            inventories,
            bookings,
            clock,
            fares,
        }
    }

    pub async fn commit(&self, req: CommitRequest) -> Result<Booking> {
        let mut seats = req.seats.clone();
        seats.sort();
        seats.dedup();

        // Double-submit guard: an identical repeat of an already confirmed
        // commit returns the existing record instead of charging twice.
        let prior =
            read_with_retry(|| self.bookings.find_by_session(&req.key, &req.session)).await?;
        for existing in prior {
            if existing.status == BookingStatus::Confirmed && existing.seats == seats {
                info!(booking_id = %existing.id, %req.session, "duplicate commit, returning existing booking");
                return Ok(existing);
            }
        }

        let inventory = read_with_retry(|| self.inventories.get(&req.key)).await?;
        let mut guard = inventory.lock().await;
        let now = self.clock.now();

        // 1. Re-validate: every seat still held by this session, none sold.
        guard.validate_held(&seats, &req.session, now)?;

        // 2. Deterministic amount from stored inputs.
        let fare = self.fares.quote(req.fare_per_seat_cents, seats.len());

        // 3. Persist the confirmed booking.
        let booking = Booking::new(
            req.key,
            seats.clone(),
            req.passenger,
            req.session.clone(),
            fare,
            guard.departs_at(),
            now,
        );
        self.bookings.insert(booking.clone()).await?;

        // 4. Mark the seats sold; roll the record back if that fails so no
        //    booking ever exists without its seats marked. The session's
        //    locks are kept so the client can retry with other seats.
        if let Err(err) = guard.mark_booked(&seats, booking.id) {
            warn!(booking_id = %booking.id, %err, "seat marking failed, rolling back booking");
            self.bookings.remove(booking.id).await?;
            return Err(err);
        }

        // 5. The hold has served its purpose.
        guard.release_locks(&seats, &req.session);

        info!(
            booking_id = %booking.id,
            key = %req.key,
            seats = ?seats,
            total_cents = booking.fare.total_cents,
            "booking confirmed"
        );
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{passenger, MemStores};
    use chrono::Duration;

    fn seats(ids: &[&str]) -> Vec<SeatId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_commit_converts_hold_into_confirmed_booking() {
        let env = MemStores::new().await;
        let session = SessionToken::issue();
        env.hold(&session, &["A1", "A2"]).await;

        let booking = env
            .transactor()
            .commit(CommitRequest {
                key: env.key,
                seats: seats(&["A1", "A2"]),
                session: session.clone(),
                passenger: passenger(),
                fare_per_seat_cents: 50_000,
            })
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.fare.total_cents, 107_000);

        let inv = env.inventories.get(&env.key).await.unwrap();
        let guard = inv.lock().await;
        let now = env.clock.now();
        assert_eq!(
            guard.status("A1", now),
            ruta_inventory::SeatStatus::Booked
        );
        // Lock consumed by the commit.
        assert!(guard.valid_lock("A1", now).is_none());
    }

    #[tokio::test]
    async fn test_commit_without_hold_is_a_conflict() {
        let env = MemStores::new().await;
        let session = SessionToken::issue();

        let err = env
            .transactor()
            .commit(CommitRequest {
                key: env.key,
                seats: seats(&["A1"]),
                session: session.clone(),
                passenger: passenger(),
                fare_per_seat_cents: 50_000,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BookingConflict { .. }));
        // No record survives a failed commit.
        assert!(env.bookings.ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_fails_once_hold_expired() {
        let env = MemStores::new().await;
        let session = SessionToken::issue();
        env.hold(&session, &["A1"]).await;

        env.clock.advance(Duration::minutes(6));

        let err = env
            .transactor()
            .commit(CommitRequest {
                key: env.key,
                seats: seats(&["A1"]),
                session,
                passenger: passenger(),
                fare_per_seat_cents: 50_000,
            })
            .await
            .unwrap_err();

        match err {
            Error::BookingConflict { conflicting } => assert_eq!(conflicting, seats(&["A1"])),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeat_commit_returns_existing_booking() {
        let env = MemStores::new().await;
        let session = SessionToken::issue();
        env.hold(&session, &["B1", "B2"]).await;

        let request = CommitRequest {
            key: env.key,
            seats: seats(&["B1", "B2"]),
            session,
            passenger: passenger(),
            fare_per_seat_cents: 30_000,
        };

        let first = env.transactor().commit(request.clone()).await.unwrap();
        // Network retry resubmits the identical request.
        let second = env.transactor().commit(request).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(env.bookings.ids().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_inventory_is_reported() {
        let env = MemStores::new().await;
        let missing = InventoryKey::new(
            uuid::Uuid::new_v4(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );

        let err = env
            .transactor()
            .commit(CommitRequest {
                key: missing,
                seats: seats(&["A1"]),
                session: SessionToken::issue(),
                passenger: passenger(),
                fare_per_seat_cents: 50_000,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InventoryNotFound { .. }));
    }
}
