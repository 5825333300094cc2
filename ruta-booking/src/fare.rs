use serde::{Deserialize, Serialize};

/// Fixed-rate surcharges applied on top of the seat subtotal. Rates come
/// from business-rule config, e.g. 0.02 for a 2% service fee.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FareSchedule {
    pub service_fee_rate: f64,
    pub tax_rate: f64,
}

impl FareSchedule {
    pub fn new(service_fee_rate: f64, tax_rate: f64) -> Self {
        Self {
            service_fee_rate,
            tax_rate,
        }
    }

    /// Prices a seat batch. All amounts in integer cents; each surcharge
    /// is rounded to the cent independently so the total reproduces from
    /// the stored inputs for audit and refund purposes.
    pub fn quote(&self, fare_per_seat_cents: i64, seat_count: usize) -> FareBreakdown {
        let subtotal_cents = fare_per_seat_cents * seat_count as i64;
        let service_fee_cents = (subtotal_cents as f64 * self.service_fee_rate).round() as i64;
        let tax_cents = (subtotal_cents as f64 * self.tax_rate).round() as i64;

        FareBreakdown {
            fare_per_seat_cents,
            seat_count: seat_count as u32,
            subtotal_cents,
            service_fee_cents,
            tax_cents,
            total_cents: subtotal_cents + service_fee_cents + tax_cents,
        }
    }
}

/// Deterministic price decomposition stored on the booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FareBreakdown {
    pub fare_per_seat_cents: i64,
    pub seat_count: u32,
    pub subtotal_cents: i64,
    pub service_fee_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Renders cents as a decimal amount, e.g. 107000 -> "1070.00".
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}
