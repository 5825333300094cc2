use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use ruta_core::keys::InventoryKey;
use ruta_core::Result;

use crate::inventory::SeatInventory;

/// Store seam for inventory units.
///
/// `get` hands out the unit behind a per-key mutex: holding the guard is
/// the row-level critical section every mutating operation on that
/// (schedule, date) pair runs inside. Different keys are independent.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Registers a new inventory unit. Fails if the key already exists.
    async fn create(&self, inventory: SeatInventory) -> Result<()>;

    /// Row-locked handle for one unit, or `InventoryNotFound`.
    async fn get(&self, key: &InventoryKey) -> Result<Arc<Mutex<SeatInventory>>>;

    /// All registered unit keys, for sweep passes.
    async fn keys(&self) -> Result<Vec<InventoryKey>>;
}
