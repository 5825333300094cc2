pub mod inventory;
pub mod locks;
pub mod store;

pub use inventory::{SeatInventory, SeatStatus};
pub use locks::{LockManager, SeatLock};
pub use store::InventoryStore;
