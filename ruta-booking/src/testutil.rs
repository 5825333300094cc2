//! In-memory store doubles for exercising the transactor and policy
//! without pulling in the real store crate.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use ruta_core::clock::{Clock, ManualClock};
use ruta_core::keys::{InventoryKey, SessionToken};
use ruta_core::{Error, Result};
use ruta_inventory::{InventoryStore, SeatInventory};

use crate::cancellation::{CancellationPolicy, RefundSchedule};
use crate::fare::FareSchedule;
use crate::models::{Booking, Passenger};
use crate::store::BookingStore;
use crate::transactor::BookingTransactor;

pub(crate) struct MemInventoryStore {
    units: RwLock<HashMap<InventoryKey, Arc<Mutex<SeatInventory>>>>,
}

#[async_trait]
impl InventoryStore for MemInventoryStore {
    async fn create(&self, inventory: SeatInventory) -> Result<()> {
        self.units
            .write()
            .await
            .insert(inventory.key(), Arc::new(Mutex::new(inventory)));
        Ok(())
    }

    async fn get(&self, key: &InventoryKey) -> Result<Arc<Mutex<SeatInventory>>> {
        self.units
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
        Ok(self.units.read().await.keys().copied().collect())
    }
}

pub(crate) struct MemBookingStore {
    rows: RwLock<HashMap<Uuid, Arc<Mutex<Booking>>>>,
}

#[async_trait]
impl BookingStore for MemBookingStore {
    async fn insert(&self, booking: Booking) -> Result<()> {
        self.rows
            .write()
            .await
            .insert(booking.id, Arc::new(Mutex::new(booking)));
        Ok(())
    }

    async fn remove(&self, booking_id: Uuid) -> Result<()> {
        self.rows.write().await.remove(&booking_id);
        Ok(())
    }

    async fn get(&self, booking_id: Uuid) -> Result<Arc<Mutex<Booking>>> {
        self.rows
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
        let mut found = Vec::new();
        for handle in self.rows.read().await.values() {
            let booking = handle.lock().await;
            if booking.key() == *key && booking.session == *session {
                found.push(booking.clone());
            }
        }
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.rows.read().await.keys().copied().collect())
    }
}

pub(crate) struct MemStores {
    pub key: InventoryKey,
    pub clock: Arc<ManualClock>,
    pub inventories: Arc<MemInventoryStore>,
    pub bookings: Arc<MemBookingStore>,
}

impl MemStores {
    pub async fn new() -> Self {
        Self::with_departure_hours(72).await
    }

    pub async fn with_departure_hours(hours: i64) -> Self {
        let clock = Arc::new(ManualClock::at(Utc::now()));
        let key = InventoryKey::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        let inventories = Arc::new(MemInventoryStore {
            units: RwLock::new(HashMap::new()),
        });
        inventories
            .create(SeatInventory::new(
                key,
                40,
                clock.now() + Duration::hours(hours),
            ))
            .await
            .unwrap();

        Self {
            key,
            clock,
            inventories,
            bookings: Arc::new(MemBookingStore {
                rows: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn transactor(&self) -> BookingTransactor<MemInventoryStore, MemBookingStore> {
        BookingTransactor::new(
            self.inventories.clone(),
            self.bookings.clone(),
            self.clock.clone(),
            FareSchedule::new(0.02, 0.05),
        )
    }

    pub fn policy(&self) -> CancellationPolicy<MemInventoryStore, MemBookingStore> {
        CancellationPolicy::new(
            self.inventories.clone(),
            self.bookings.clone(),
            self.clock.clone(),
            RefundSchedule::default(),
        )
    }

    pub async fn hold(&self, session: &SessionToken, seats: &[&str]) {
        let seats: Vec<String> = seats.iter().map(|s| s.to_string()).collect();
        let inventory = self.inventories.get(&self.key).await.unwrap();
        inventory
            .lock()
            .await
            .acquire(&seats, session, Duration::minutes(5), self.clock.now())
            .unwrap();
    }
}

pub(crate) fn passenger() -> Passenger {
    Passenger {
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        contact: serde_json::json!({ "phone": "+91-98000-00000" }),
    }
}
