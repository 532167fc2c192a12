//! Billing calculation for active parking sessions.
//!
//! The calculator is a pure function of its inputs: elapsed time is costed
//! at the tariff's hourly rate (prorated by the second), then loyalty points
//! are redeemed at a fixed value per point. The final amount is floored at
//! zero.
//!
//! ```
//! use chrono::{Duration, Utc};
//! use parkease_core::BillingCalculator;
//! use rust_decimal_macros::dec;
//!
//! let entry = Utc::now();
//! let now = entry + Duration::hours(1);
//! let result = BillingCalculator::default()
//!     .calculate(entry, now, dec!(2.50), 150, 150)
//!     .unwrap();
//!
//! assert_eq!(result.gross_cost, dec!(2.50));
//! assert_eq!(result.discount, dec!(1.50));
//! assert_eq!(result.final_amount, dec!(1.00));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};

/// Currency value of one loyalty point.
pub const POINT_VALUE: Decimal = dec!(0.01);

/// Seconds per billed hour.
const SECONDS_PER_HOUR: Decimal = dec!(3600);

/// Computed charge and discount for a session at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingResult {
    /// Fractional hours parked.
    pub hours_parked: Decimal,

    /// Cost before redemption.
    pub gross_cost: Decimal,

    /// Points the plate had available.
    pub points_available: u64,

    /// Points actually redeemed (request clamped to `[0, points_available]`).
    pub points_redeemed: u64,

    /// Currency value of the redeemed points.
    pub discount: Decimal,

    /// Amount due, never negative.
    pub final_amount: Decimal,
}

impl BillingResult {
    /// The final amount rounded to cents, as charged and persisted.
    #[must_use]
    pub fn amount_due(&self) -> Decimal {
        self.final_amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Converts parked time and a tariff into a payable amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCalculator {
    point_value: Decimal,
}

impl Default for BillingCalculator {
    fn default() -> Self {
        Self {
            point_value: POINT_VALUE,
        }
    }
}

impl BillingCalculator {
    /// Create a calculator with a custom point value.
    ///
    /// Negative values are treated as zero.
    #[must_use]
    pub fn with_point_value(point_value: Decimal) -> Self {
        Self {
            point_value: point_value.max(Decimal::ZERO),
        }
    }

    /// Currency value of a single point.
    #[must_use]
    pub const fn point_value(&self) -> Decimal {
        self.point_value
    }

    /// Compute the bill for a session that entered at `entry` as of `now`.
    ///
    /// Elapsed time is counted in whole seconds. `points_requested` outside
    /// `[0, points_available]` is clamped, not rejected.
    ///
    /// # Errors
    ///
    /// - `BillingError::InvalidInterval` if `now` precedes `entry`.
    /// - `BillingError::InvalidTariff` if `price_per_hour` is negative.
    /// - `BillingError::AmountOverflow` if the cost or discount does not fit
    ///   in a `Decimal`.
    pub fn calculate(
        &self,
        entry: DateTime<Utc>,
        now: DateTime<Utc>,
        price_per_hour: Decimal,
        points_available: u64,
        points_requested: i64,
    ) -> Result<BillingResult> {
        if now < entry {
            return Err(BillingError::InvalidInterval { entry, now });
        }
        if price_per_hour < Decimal::ZERO {
            return Err(BillingError::InvalidTariff { price_per_hour });
        }

        let seconds = (now - entry).num_seconds();
        let hours_parked = Decimal::from(seconds) / SECONDS_PER_HOUR;
        let gross_cost = hours_parked
            .checked_mul(price_per_hour)
            .ok_or(BillingError::AmountOverflow)?;

        let points_redeemed = u64::try_from(points_requested)
            .unwrap_or(0)
            .min(points_available);
        let discount = Decimal::from(points_redeemed)
            .checked_mul(self.point_value)
            .ok_or(BillingError::AmountOverflow)?;
        let final_amount = gross_cost
            .checked_sub(discount)
            .ok_or(BillingError::AmountOverflow)?
            .max(Decimal::ZERO);

        Ok(BillingResult {
            hours_parked,
            gross_cost,
            points_available,
            points_redeemed,
            discount,
            final_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry() -> DateTime<Utc> {
        "2024-03-01T09:00:00Z".parse().unwrap()
    }

    fn calc() -> BillingCalculator {
        BillingCalculator::default()
    }

    #[test]
    fn two_and_a_half_hours_without_points() {
        let now = entry() + Duration::minutes(150);
        let result = calc().calculate(entry(), now, dec!(2.50), 0, 0).unwrap();

        assert_eq!(result.hours_parked, dec!(2.5));
        assert_eq!(result.gross_cost, dec!(6.25));
        assert_eq!(result.points_redeemed, 0);
        assert_eq!(result.discount, Decimal::ZERO);
        assert_eq!(result.final_amount, dec!(6.25));
    }

    #[test]
    fn one_hour_redeeming_all_points() {
        let now = entry() + Duration::hours(1);
        let result = calc()
            .calculate(entry(), now, dec!(2.50), 150, 150)
            .unwrap();

        assert_eq!(result.gross_cost, dec!(2.50));
        assert_eq!(result.points_redeemed, 150);
        assert_eq!(result.discount, dec!(1.50));
        assert_eq!(result.final_amount, dec!(1.00));
    }

    #[test]
    fn redemption_is_clamped_to_balance() {
        let now = entry() + Duration::hours(1);
        let result = calc()
            .calculate(entry(), now, dec!(2.50), 150, 500)
            .unwrap();

        assert_eq!(result.points_redeemed, 150);
        assert_eq!(result.points_available, 150);
    }

    #[test]
    fn negative_redemption_is_clamped_to_zero() {
        let now = entry() + Duration::hours(1);
        let result = calc().calculate(entry(), now, dec!(2.50), 150, -20).unwrap();

        assert_eq!(result.points_redeemed, 0);
        assert_eq!(result.final_amount, dec!(2.50));
    }

    #[test]
    fn discount_larger_than_cost_floors_at_zero() {
        // 12 minutes at 2.50/h = 0.50; 150 points = 1.50
        let now = entry() + Duration::minutes(12);
        let result = calc()
            .calculate(entry(), now, dec!(2.50), 150, 150)
            .unwrap();

        assert_eq!(result.gross_cost, dec!(0.50));
        assert_eq!(result.discount, dec!(1.50));
        assert_eq!(result.final_amount, Decimal::ZERO);
    }

    #[test]
    fn zero_elapsed_costs_nothing() {
        let result = calc()
            .calculate(entry(), entry(), dec!(2.50), 500, 500)
            .unwrap();

        assert_eq!(result.hours_parked, Decimal::ZERO);
        assert_eq!(result.gross_cost, Decimal::ZERO);
        assert_eq!(result.final_amount, Decimal::ZERO);
    }

    #[test]
    fn now_before_entry_is_invalid_interval() {
        let now = entry() - Duration::seconds(1);
        let err = calc().calculate(entry(), now, dec!(2.50), 0, 0).unwrap_err();

        assert_eq!(
            err,
            BillingError::InvalidInterval {
                entry: entry(),
                now
            }
        );
    }

    #[test]
    fn negative_rate_is_invalid_tariff() {
        let now = entry() + Duration::hours(1);
        let err = calc().calculate(entry(), now, dec!(-0.5), 0, 0).unwrap_err();

        assert!(matches!(err, BillingError::InvalidTariff { .. }));
    }

    #[test]
    fn huge_rate_overflows_without_panicking() {
        let now = entry() + Duration::hours(2);
        let err = calc()
            .calculate(entry(), now, Decimal::MAX, 0, 0)
            .unwrap_err();

        assert_eq!(err, BillingError::AmountOverflow);
    }

    #[test]
    fn huge_point_value_overflows_without_panicking() {
        let now = entry() + Duration::hours(1);
        let err = BillingCalculator::with_point_value(Decimal::MAX)
            .calculate(entry(), now, dec!(2.50), u64::MAX, i64::MAX)
            .unwrap_err();

        assert_eq!(err, BillingError::AmountOverflow);
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let now = entry() + Duration::seconds(4_321);
        let first = calc().calculate(entry(), now, dec!(3.10), 40, 25).unwrap();
        let second = calc().calculate(entry(), now, dec!(3.10), 40, 25).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn sub_second_remainder_is_ignored() {
        let now = entry() + Duration::milliseconds(3_600_999);
        let result = calc().calculate(entry(), now, dec!(2.50), 0, 0).unwrap();

        assert_eq!(result.hours_parked, dec!(1));
    }

    #[test]
    fn amount_due_rounds_half_away_from_zero() {
        // 45 minutes at 2.50/h = 1.875
        let now = entry() + Duration::minutes(45);
        let result = calc().calculate(entry(), now, dec!(2.50), 0, 0).unwrap();

        assert_eq!(result.final_amount, dec!(1.875));
        assert_eq!(result.amount_due(), dec!(1.88));
    }

    #[test]
    fn custom_point_value() {
        let now = entry() + Duration::hours(2);
        let result = BillingCalculator::with_point_value(dec!(0.05))
            .calculate(entry(), now, dec!(2.00), 20, 20)
            .unwrap();

        assert_eq!(result.discount, dec!(1.00));
        assert_eq!(result.final_amount, dec!(3.00));
    }

    #[test]
    fn sweep_keeps_invariants() {
        for minutes in [0_i64, 1, 7, 59, 60, 61, 600, 1_441] {
            for requested in [-5_i64, 0, 10, 250, 10_000] {
                let now = entry() + Duration::minutes(minutes);
                let r = calc().calculate(entry(), now, dec!(2.50), 250, requested).unwrap();

                assert!(r.gross_cost >= Decimal::ZERO);
                assert!(r.final_amount >= Decimal::ZERO);
                assert!(r.points_redeemed <= 250);
                assert_eq!(
                    r.final_amount,
                    (r.gross_cost - Decimal::from(r.points_redeemed) * POINT_VALUE)
                        .max(Decimal::ZERO)
                );
            }
        }
    }
}
