use chrono::Duration;
use serde::Deserialize;
use std::env;

use ruta_booking::{FareSchedule, RefundSchedule, RefundTier};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Soft-hold lifetime: long enough to finish the booking form, short
    /// enough not to starve other shoppers when a session walks away.
    #[serde(default = "default_seat_hold_seconds")]
    pub seat_hold_seconds: u64,
    pub service_fee_rate: f64,
    pub tax_rate: f64,
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
    /// Refund payout table; empty means the built-in tiers.
    #[serde(default)]
    pub refund_tiers: Vec<RefundTierRule>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RefundTierRule {
    pub min_hours: i64,
    pub percentage: u8,
}

fn default_seat_hold_seconds() -> u64 {
    300
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

impl BusinessRules {
    pub fn seat_hold_ttl(&self) -> Duration {
        Duration::seconds(self.seat_hold_seconds as i64)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn fare_schedule(&self) -> FareSchedule {
        FareSchedule::new(self.service_fee_rate, self.tax_rate)
    }

    pub fn refund_schedule(&self) -> RefundSchedule {
        if self.refund_tiers.is_empty() {
            return RefundSchedule::default();
        }
        RefundSchedule::new(
            self.refund_tiers
                .iter()
                .map(|rule| RefundTier {
                    min_hours: rule.min_hours,
                    percentage: rule.percentage,
                })
                .collect(),
        )
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            seat_hold_seconds: default_seat_hold_seconds(),
            service_fee_rate: 0.02,
            tax_rate: 0.05,
            sweep_interval_seconds: default_sweep_interval_seconds(),
            refund_tiers: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            business_rules: BusinessRules::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `RUTA_BUSINESS_RULES__TAX_RATE=0.05`
            .add_source(config::Environment::with_prefix("RUTA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = BusinessRules::default();
        assert_eq!(rules.seat_hold_ttl(), Duration::minutes(5));
        assert_eq!(rules.refund_schedule().cancellable_from_hours(), 12);

        let fare = rules.fare_schedule().quote(50_000, 2);
        assert_eq!(fare.total_cents, 107_000);
    }

    #[test]
    fn test_configured_tiers_override_builtin() {
        let rules = BusinessRules {
            refund_tiers: vec![
                RefundTierRule {
                    min_hours: 24,
                    percentage: 50,
                },
                RefundTierRule {
                    min_hours: 72,
                    percentage: 95,
                },
            ],
            ..BusinessRules::default()
        };

        let schedule = rules.refund_schedule();
        assert_eq!(schedule.percentage_for(80.0), 95);
        assert_eq!(schedule.percentage_for(30.0), 50);
        assert_eq!(schedule.cancellable_from_hours(), 24);
    }
}
