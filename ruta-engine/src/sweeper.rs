use std::sync::Arc;
use tracing::{error, info};

use ruta_booking::BookingStore;
use ruta_inventory::InventoryStore;

use crate::ReservationEngine;

/// Periodic maintenance loop: reclaims expired seat holds and promotes
/// departed bookings to completed. Runs until the task is aborted.
pub async fn run_sweeper<I, B>(
    engine: Arc<ReservationEngine<I, B>>,
    interval: std::time::Duration,
) where
    I: InventoryStore,
    B: BookingStore,
{
    info!(interval_secs = interval.as_secs(), "sweeper started");
    let mut ticker = tokio::time::interval(interval);
    // First tick fires immediately; skip it so a fresh engine is not swept
    // before it has any state.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(err) = engine.sweep_expired_locks().await {
            error!(%err, "lock sweep failed");
        }
        if let Err(err) = engine.complete_departed().await {
            error!(%err, "departure completion sweep failed");
        }
    }
}
