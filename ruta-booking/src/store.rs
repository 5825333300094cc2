use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use ruta_core::keys::{InventoryKey, SessionToken};
use ruta_core::Result;

use crate::models::Booking;

/// Store seam for booking records.
///
/// `get` hands out the record behind a per-booking mutex: commit and
/// cancellation on the same booking serialize on it (booking id is the
/// second serialization key besides the inventory key).
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: Booking) -> Result<()>;

    /// Removes a record persisted by a commit that later failed its
    /// seat-marking step. Not part of cancellation.
    async fn remove(&self, booking_id: Uuid) -> Result<()>;

    /// Row-locked handle for one booking, or `BookingNotFound`.
    async fn get(&self, booking_id: Uuid) -> Result<Arc<Mutex<Booking>>>;

    /// Snapshots of the session's bookings on one inventory unit, newest
    /// first. Drives the double-submit idempotency probe.
    async fn find_by_session(
        &self,
        key: &InventoryKey,
        session: &SessionToken,
    ) -> Result<Vec<Booking>>;

    /// All booking ids, for the departure-completion sweep.
    async fn ids(&self) -> Result<Vec<Uuid>>;
}
