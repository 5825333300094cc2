use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ruta_booking::fare::format_cents;
use ruta_booking::{CommitRequest, Passenger};
use ruta_core::keys::{SeatId, SessionToken};
use ruta_engine::{sweeper::run_sweeper, ReservationEngine};
use ruta_store::Config;

fn seats(ids: &[&str]) -> Vec<SeatId> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ruta_engine=info,ruta_booking=info,ruta_inventory=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(%err, "config not loaded, using built-in defaults");
        Config::default()
    });

    let engine = Arc::new(ReservationEngine::in_memory(config.business_rules));
    let sweeper = tokio::spawn(run_sweeper(engine.clone(), engine.rules().sweep_interval()));

    // Walk one contention scenario end to end against the in-memory store.
    let schedule_id = Uuid::new_v4();
    let journey_date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let key = engine
        .open_inventory(schedule_id, journey_date, 40, Utc::now() + Duration::hours(40))
        .await
        .expect("open inventory");

    let session_a = SessionToken::issue();
    let session_b = SessionToken::issue();

    engine
        .acquire_locks(&key, &seats(&["A1", "A2"]), &session_a, None)
        .await
        .expect("session A holds A1/A2");

    match engine
        .acquire_locks(&key, &seats(&["A2", "A3"]), &session_b, None)
        .await
    {
        Err(err) => tracing::info!(%err, "session B lost the race for A2"),
        Ok(_) => unreachable!("A2 is held by session A"),
    }

    let booking = engine
        .commit_booking(CommitRequest {
            key,
            seats: seats(&["A1", "A2"]),
            session: session_a,
            passenger: Passenger {
                first_name: "Asha".to_string(),
                last_name: "Verma".to_string(),
                contact: serde_json::json!({ "phone": "+91-98000-00000" }),
            },
            fare_per_seat_cents: 50_000,
        })
        .await
        .expect("commit booking");
    tracing::info!(
        booking_id = %booking.id,
        total = %format_cents(booking.fare.total_cents),
        "booking confirmed"
    );

    engine
        .acquire_locks(&key, &seats(&["A3"]), &session_b, None)
        .await
        .expect("session B retries with A3");

    let cancelled = engine
        .cancel_booking(booking.id)
        .await
        .expect("cancel booking");
    let refund = cancelled.refund.expect("refund recorded");
    tracing::info!(
        percentage = refund.percentage,
        amount = %format_cents(refund.amount_cents),
        "refund issued, seats back in the pool"
    );

    sweeper.abort();
}
