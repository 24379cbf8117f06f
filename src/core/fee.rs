//! Fee calculation.
//!
//! Fees are billed per started hour: `ceil(duration / 1h) * hourly_rate`,
//! rounded to cents half-up. Durations are measured on full-precision UTC
//! instants.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::ParkingError;

const NANOS_PER_HOUR: u64 = 3_600_000_000_000;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Currency precision in decimal places.
pub const CURRENCY_DP: u32 = 2;

/// Stateless fee calculator with a floor on billed hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeCalculator {
    /// Hours billed at least, even for a zero-length stay.
    pub minimum_billed_hours: u32,
}

impl FeeCalculator {
    /// Calculator billing at least `minimum_billed_hours`.
    pub const fn new(minimum_billed_hours: u32) -> Self {
        Self {
            minimum_billed_hours,
        }
    }

    /// Number of billed hours between `entry` and `exit`.
    pub fn billed_hours(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> Result<u64, ParkingError> {
        Ok(started_hours(entry, exit)?.max(u64::from(self.minimum_billed_hours)))
    }

    /// Amount due for a stay from `entry` to `exit` at `hourly_rate`.
    pub fn fee(
        &self,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
        hourly_rate: Decimal,
    ) -> Result<Decimal, ParkingError> {
        let hours = self.billed_hours(entry, exit)?;
        Ok(amount(hours, hourly_rate))
    }
}

/// Amount due for a stay with no minimum charge.
pub fn fee(entry: DateTime<Utc>, exit: DateTime<Utc>, hourly_rate: Decimal) -> Result<Decimal, ParkingError> {
    FeeCalculator::default().fee(entry, exit, hourly_rate)
}

/// Round an amount to currency precision, half away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn started_hours(entry: DateTime<Utc>, exit: DateTime<Utc>) -> Result<u64, ParkingError> {
    if exit < entry {
        return Err(ParkingError::NegativeDuration { entry, exit });
    }
    let elapsed = exit - entry;
    // Nanosecond precision overflows past ~292 years; seconds are plenty there.
    let hours = match elapsed.num_nanoseconds().and_then(|n| u64::try_from(n).ok()) {
        Some(nanos) => nanos.div_ceil(NANOS_PER_HOUR),
        None => u64::try_from(elapsed.num_seconds())
            .unwrap_or(u64::MAX)
            .div_ceil(SECONDS_PER_HOUR),
    };
    Ok(hours)
}

fn amount(hours: u64, hourly_rate: Decimal) -> Decimal {
    let raw = Decimal::from(hours)
        .checked_mul(hourly_rate)
        .unwrap_or(Decimal::MAX);
    round_currency(raw)
}
