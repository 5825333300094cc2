use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seat number as printed on the coach layout, e.g. "A1".
pub type SeatId = String;

/// Identifies one inventory unit: the seat pool for one schedule on one
/// journey date. Operations on different keys are fully independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryKey {
    pub schedule_id: Uuid,
    pub journey_date: NaiveDate,
}

impl InventoryKey {
    pub fn new(schedule_id: Uuid, journey_date: NaiveDate) -> Self {
        Self {
            schedule_id,
            journey_date,
        }
    }
}

impl std::fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.schedule_id, self.journey_date)
    }
}

/// Opaque, server-issued shopper session token. The core only compares it
/// for equality; it carries no identity semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn issue() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
