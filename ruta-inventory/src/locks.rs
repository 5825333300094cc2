use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use ruta_core::clock::Clock;
use ruta_core::keys::{InventoryKey, SeatId, SessionToken};
use ruta_core::Result;

use crate::store::InventoryStore;

/// A session-scoped soft hold on a single seat. Never consulted past
/// `expires_at`, even while the entry is still in the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLock {
    pub seat_id: SeatId,
    pub session: SessionToken,
    pub schedule_id: Uuid,
    pub journey_date: NaiveDate,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SeatLock {
    pub fn new(
        key: InventoryKey,
        seat_id: SeatId,
        session: SessionToken,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            seat_id,
            session,
            schedule_id: key.schedule_id,
            journey_date: key.journey_date,
            acquired_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Mediates short-term seat contention between competing shoppers.
///
/// First valid acquirer wins; there is no queueing. Each call evaluates
/// its whole seat batch inside the inventory's critical section, so two
/// overlapping batches can never both succeed.
pub struct LockManager<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<S: InventoryStore> LockManager<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            store,
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Grants `session` a hold on every seat in `seats`, or none of them.
    /// On conflict the error carries exactly the contested subset so the
    /// shopper can pick different seats.
    pub async fn acquire(
        &self,
        key: &InventoryKey,
        seats: &[SeatId],
        session: &SessionToken,
        ttl: Option<Duration>,
    ) -> Result<Vec<SeatLock>> {
        let inventory = self.store.get(key).await?;
        let mut guard = inventory.lock().await;
        let now = self.clock.now();

        match guard.acquire(seats, session, ttl.unwrap_or(self.default_ttl), now) {
            Ok(granted) => {
                info!(%key, %session, seats = ?seats, "seat locks granted");
                Ok(granted)
            }
            Err(err) => {
                debug!(%key, %session, %err, "seat lock conflict");
                Err(err)
            }
        }
    }

    /// Drops `session`'s holds on `seats`. Idempotent; holds owned by
    /// other sessions are left untouched.
    pub async fn release(
        &self,
        key: &InventoryKey,
        seats: &[SeatId],
        session: &SessionToken,
    ) -> Result<()> {
        let inventory = self.store.get(key).await?;
        let mut guard = inventory.lock().await;
        guard.release_locks(seats, session);
        debug!(%key, %session, seats = ?seats, "seat locks released");
        Ok(())
    }

    /// Removes expired holds across every inventory unit. Purely a
    /// memory-reclaim pass; reads already treat expired holds as absent.
    pub async fn sweep_expired(&self) -> Result<usize> {
        let mut removed = 0;
        for key in self.store.keys().await? {
            let inventory = self.store.get(&key).await?;
            let mut guard = inventory.lock().await;
            removed += guard.sweep_expired(self.clock.now());
        }
        if removed > 0 {
            info!(removed, "swept expired seat locks");
        }
        Ok(removed)
    }
}
