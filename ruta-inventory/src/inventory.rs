use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use ruta_core::keys::{InventoryKey, SeatId, SessionToken};
use ruta_core::{Error, Result};

use crate::locks::SeatLock;

/// Observable state of a single seat. Booked takes precedence over locked;
/// a lock past its expiry reads as available even before a sweep runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

/// Authoritative seat occupancy for one (schedule, journey date) unit.
///
/// Invariant: a seat is in exactly one of {available, locked, booked} at
/// any observed instant. `booked` and the set of *valid* locks never
/// overlap; expiry is decided by timestamp comparison, never sweep timing.
#[derive(Debug, Clone)]
pub struct SeatInventory {
    key: InventoryKey,
    departs_at: DateTime<Utc>,
    total_seats: u32,
    booked: HashMap<SeatId, Uuid>,
    locks: HashMap<SeatId, SeatLock>,
}

impl SeatInventory {
    pub fn new(key: InventoryKey, total_seats: u32, departs_at: DateTime<Utc>) -> Self {
        Self {
            key,
            departs_at,
            total_seats,
            booked: HashMap::new(),
            locks: HashMap::new(),
        }
    }

    pub fn key(&self) -> InventoryKey {
        self.key
    }

    pub fn departs_at(&self) -> DateTime<Utc> {
        self.departs_at
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn booked_count(&self) -> usize {
        self.booked.len()
    }

    pub fn status(&self, seat: &str, now: DateTime<Utc>) -> SeatStatus {
        if self.booked.contains_key(seat) {
            return SeatStatus::Booked;
        }
        match self.valid_lock(seat, now) {
            Some(_) => SeatStatus::Locked,
            None => SeatStatus::Available,
        }
    }

    /// The live lock on a seat, if any. Expired entries are treated as
    /// absent regardless of whether a sweep has removed them yet.
    pub fn valid_lock(&self, seat: &str, now: DateTime<Utc>) -> Option<&SeatLock> {
        self.locks.get(seat).filter(|lock| !lock.is_expired(now))
    }

    /// Atomic batch acquisition: either every requested seat is granted a
    /// lock for `session`, or none is and the conflicting subset is
    /// returned in the error. A seat already locked by the same session is
    /// refreshed rather than rejected.
    pub fn acquire(
        &mut self,
        seats: &[SeatId],
        session: &SessionToken,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatLock>> {
        let conflicting: Vec<SeatId> = seats
            .iter()
            .filter(|seat| {
                self.booked.contains_key(*seat)
                    || self
                        .valid_lock(seat, now)
                        .is_some_and(|lock| lock.session != *session)
            })
            .cloned()
            .collect();

        if !conflicting.is_empty() {
            return Err(Error::SeatUnavailable { conflicting });
        }

        let mut granted = Vec::with_capacity(seats.len());
        for seat in seats {
            let lock = match self.locks.get(seat) {
                // Same-session refresh keeps the original acquisition time.
                Some(existing) if !existing.is_expired(now) => {
                    let mut refreshed = existing.clone();
                    refreshed.expires_at = now + ttl;
                    refreshed
                }
                _ => SeatLock::new(self.key, seat.clone(), session.clone(), ttl, now),
            };
            self.locks.insert(seat.clone(), lock.clone());
            granted.push(lock);
        }
        Ok(granted)
    }

    /// Removes locks on `seats` owned by `session`. Seats locked by other
    /// sessions or not locked at all are silently ignored.
    pub fn release_locks(&mut self, seats: &[SeatId], session: &SessionToken) {
        for seat in seats {
            if self
                .locks
                .get(seat)
                .is_some_and(|lock| lock.session == *session)
            {
                self.locks.remove(seat);
            }
        }
    }

    /// Commit-time re-validation: every seat must hold a live lock owned
    /// by `session` and must not already be booked.
    pub fn validate_held(
        &self,
        seats: &[SeatId],
        session: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conflicting: Vec<SeatId> = seats
            .iter()
            .filter(|seat| {
                self.booked.contains_key(*seat)
                    || !self
                        .valid_lock(seat, now)
                        .is_some_and(|lock| lock.session == *session)
            })
            .cloned()
            .collect();

        if conflicting.is_empty() {
            Ok(())
        } else {
            Err(Error::BookingConflict { conflicting })
        }
    }

    /// Marks all of `seats` permanently sold to `booking_id`, or none of
    /// them if any is already booked.
    pub fn mark_booked(&mut self, seats: &[SeatId], booking_id: Uuid) -> Result<()> {
        let conflicting: Vec<SeatId> = seats
            .iter()
            .filter(|seat| self.booked.contains_key(*seat))
            .cloned()
            .collect();

        if !conflicting.is_empty() {
            return Err(Error::BookingConflict { conflicting });
        }

        for seat in seats {
            self.booked.insert(seat.clone(), booking_id);
        }
        Ok(())
    }

    /// Returns seats to the available pool on cancellation. No-op for
    /// seats not currently booked.
    pub fn release_booked(&mut self, seats: &[SeatId]) {
        for seat in seats {
            self.booked.remove(seat);
        }
    }

    /// Drops locks whose expiry has passed and returns how many were
    /// removed. Status reads already honor expiry, so sweeping only
    /// reclaims memory.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| !lock.is_expired(now));
        before - self.locks.len()
    }
}
