pub mod sweeper;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ruta_booking::{
    Booking, BookingStore, BookingTransactor, CancellationPolicy, CommitRequest,
};
use ruta_core::clock::{Clock, SystemClock};
use ruta_core::keys::{InventoryKey, SeatId, SessionToken};
use ruta_core::Result;
use ruta_inventory::{InventoryStore, LockManager, SeatInventory, SeatLock, SeatStatus};
use ruta_store::{BusinessRules, MemoryStore};

/// The surface exposed to collaborators: lock acquisition, booking commit,
/// cancellation and seat status over injected stores. Each operation
/// serializes on the inventory unit it touches; cancellation additionally
/// serializes on the booking row.
pub struct ReservationEngine<I, B> {
    inventories: Arc<I>,
    bookings: Arc<B>,
    clock: Arc<dyn Clock>,
    locks: LockManager<I>,
    transactor: BookingTransactor<I, B>,
    policy: CancellationPolicy<I, B>,
    rules: BusinessRules,
}

impl<I: InventoryStore, B: BookingStore> ReservationEngine<I, B> {
    pub fn new(
        inventories: Arc<I>,
        bookings: Arc<B>,
        clock: Arc<dyn Clock>,
        rules: BusinessRules,
    ) -> Self {
        let locks = LockManager::new(inventories.clone(), clock.clone(), rules.seat_hold_ttl());
        let transactor = BookingTransactor::new(
            inventories.clone(),
            bookings.clone(),
            clock.clone(),
            rules.fare_schedule(),
        );
        let policy = CancellationPolicy::new(
            inventories.clone(),
            bookings.clone(),
            clock.clone(),
            rules.refund_schedule(),
        );

        Self {
            inventories,
            bookings,
            clock,
            locks,
            transactor,
            policy,
            rules,
        }
    }

    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    /// Registers the seat pool for one schedule on one journey date.
    pub async fn open_inventory(
        &self,
        schedule_id: Uuid,
        journey_date: NaiveDate,
        total_seats: u32,
        departs_at: DateTime<Utc>,
    ) -> Result<InventoryKey> {
        let key = InventoryKey::new(schedule_id, journey_date);
        self.inventories
            .create(SeatInventory::new(key, total_seats, departs_at))
            .await?;
        info!(%key, total_seats, %departs_at, "inventory unit opened");
        Ok(key)
    }

    /// Soft-holds a seat batch for a shopper session. All-or-nothing; the
    /// error names exactly the contested seats.
    pub async fn acquire_locks(
        &self,
        key: &InventoryKey,
        seats: &[SeatId],
        session: &SessionToken,
        ttl: Option<Duration>,
    ) -> Result<Vec<SeatLock>> {
        self.locks.acquire(key, seats, session, ttl).await
    }

    /// Releases the session's holds. Idempotent.
    pub async fn release_locks(
        &self,
        key: &InventoryKey,
        seats: &[SeatId],
        session: &SessionToken,
    ) -> Result<()> {
        self.locks.release(key, seats, session).await
    }

    /// Converts held seats plus passenger data into a confirmed booking.
    pub async fn commit_booking(&self, request: CommitRequest) -> Result<Booking> {
        self.transactor.commit(request).await
    }

    /// Cancels a confirmed booking within the allowed window, stamping the
    /// refund and returning its seats to the pool.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<Booking> {
        self.policy.cancel(booking_id).await
    }

    pub async fn seat_status(&self, key: &InventoryKey, seat: &str) -> Result<SeatStatus> {
        let inventory = self.inventories.get(key).await?;
        let guard = inventory.lock().await;
        Ok(guard.status(seat, self.clock.now()))
    }

    /// Point-in-time snapshot of a booking record.
    pub async fn booking(&self, booking_id: Uuid) -> Result<Booking> {
        let handle = self.bookings.get(booking_id).await?;
        let snapshot = handle.lock().await.clone();
        Ok(snapshot)
    }

    /// Reclaims expired holds. Optional; reads already honor expiry.
    pub async fn sweep_expired_locks(&self) -> Result<usize> {
        self.locks.sweep_expired().await
    }

    /// Promotes confirmed bookings past departure to completed.
    pub async fn complete_departed(&self) -> Result<usize> {
        self.policy.complete_departed().await
    }
}

impl ReservationEngine<MemoryStore, MemoryStore> {
    /// Engine over a single in-memory store and the wall clock.
    pub fn in_memory(rules: BusinessRules) -> Self {
        Self::in_memory_with_clock(rules, Arc::new(SystemClock))
    }

    /// Same, with an injected clock for deterministic tests.
    pub fn in_memory_with_clock(rules: BusinessRules, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, clock, rules)
    }
}
