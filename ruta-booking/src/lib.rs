pub mod cancellation;
pub mod fare;
pub mod models;
pub mod store;
pub mod transactor;

pub use cancellation::{CancellationPolicy, RefundSchedule, RefundTier};
pub use fare::{FareBreakdown, FareSchedule};
pub use models::{Booking, BookingStatus, Passenger, Refund};
pub use store::BookingStore;
pub use transactor::{BookingTransactor, CommitRequest};

#[cfg(test)]
pub(crate) mod testutil;
