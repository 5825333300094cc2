use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use ruta_booking::{Booking, BookingStore};
use ruta_core::keys::{InventoryKey, SessionToken};
use ruta_core::{Error, Result};
use ruta_inventory::{InventoryStore, SeatInventory};

/// In-memory implementation of both store seams.
///
/// Every inventory unit and every booking sits behind its own
/// `Arc<Mutex<_>>`: holding a guard is the row-level lock of the
/// concurrency model, and rows under different keys proceed in parallel.
/// The outer maps are only touched to register or look up handles. A
/// relational or key-value backend slots in behind the same traits.
pub struct MemoryStore {
    inventories: RwLock<HashMap<InventoryKey, Arc<Mutex<SeatInventory>>>>,
    bookings: RwLock<HashMap<Uuid, Arc<Mutex<Booking>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inventories: RwLock::new(HashMap::new()),
            bookings: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn create(&self, inventory: SeatInventory) -> Result<()> {
        let key = inventory.key();
        let mut units = self.inventories.write().await;
        if units.contains_key(&key) {
            return Err(Error::Store(format!("inventory {key} already exists")));
        }
        units.insert(key, Arc::new(Mutex::new(inventory)));
        debug!(%key, "inventory unit registered");
        Ok(())
    }

    async fn get(&self, key: &InventoryKey) -> Result<Arc<Mutex<SeatInventory>>> {
        self.inventories
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or(Error::InventoryNotFound {
                schedule_id: key.schedule_id,
                journey_date: key.journey_date,
            })
    }

    async fn keys(&self) -> Result<Vec<InventoryKey>> {
        Ok(self.inventories.read().await.keys().copied().collect())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert(&self, booking: Booking) -> Result<()> {
        let id = booking.id;
        self.bookings
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(booking)));
        debug!(booking_id = %id, "booking persisted");
        Ok(())
    }

    async fn remove(&self, booking_id: Uuid) -> Result<()> {
        self.bookings.write().await.remove(&booking_id);
        debug!(%booking_id, "booking rolled back");
        Ok(())
    }

    async fn get(&self, booking_id: Uuid) -> Result<Arc<Mutex<Booking>>> {
        self.bookings
            .read()
            .await
            .get(&booking_id)
            .cloned()
            .ok_or(Error::BookingNotFound { booking_id })
    }

    async fn find_by_session(
        &self,
        key: &InventoryKey,
        session: &SessionToken,
    ) -> Result<Vec<Booking>> {
        let handles: Vec<_> = self.bookings.read().await.values().cloned().collect();
        let mut found = Vec::new();
        for handle in handles {
            let booking = handle.lock().await;
            if booking.key() == *key && booking.session == *session {
                found.push(booking.clone());
            }
        }
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.bookings.read().await.keys().copied().collect())
    }
}
