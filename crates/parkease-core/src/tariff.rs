//! Tariff types for parkease.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};
use crate::TariffId;

/// Display name of the tariff applied when a branch has none configured.
pub const STANDARD_TARIFF_NAME: &str = "Standard Rate";

/// Price per hour of the standard tariff.
pub const STANDARD_RATE_PER_HOUR: Decimal = dec!(2.50);

/// Highest price per hour a tariff may carry.
pub const MAX_RATE_PER_HOUR: Decimal = dec!(10000);

/// A pricing rule applied to parking sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tariff {
    /// Tariff identifier.
    pub id: TariffId,

    /// Display name (e.g. "Standard Rate").
    pub name: String,

    /// Price charged per parked hour, prorated by the second.
    pub price_per_hour: Decimal,
}

impl Tariff {
    /// Create a tariff, rejecting rates outside `0..=MAX_RATE_PER_HOUR`.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidTariff` if `price_per_hour` is out of range.
    pub fn new(name: impl Into<String>, price_per_hour: Decimal) -> Result<Self> {
        let tariff = Self {
            id: TariffId::generate(),
            name: name.into(),
            price_per_hour,
        };
        tariff.validate()?;
        Ok(tariff)
    }

    /// The standard 2.50/h tariff.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            id: TariffId::generate(),
            name: STANDARD_TARIFF_NAME.to_string(),
            price_per_hour: STANDARD_RATE_PER_HOUR,
        }
    }

    /// Check that the rate lies in `0..=MAX_RATE_PER_HOUR`.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidTariff` if `price_per_hour` is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.price_per_hour < Decimal::ZERO || self.price_per_hour > MAX_RATE_PER_HOUR {
            return Err(BillingError::InvalidTariff {
                price_per_hour: self.price_per_hour,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tariff_rate() {
        let tariff = Tariff::standard();
        assert_eq!(tariff.name, "Standard Rate");
        assert_eq!(tariff.price_per_hour, dec!(2.5));
    }

    #[test]
    fn negative_rate_rejected() {
        let err = Tariff::new("Broken", dec!(-1)).unwrap_err();
        assert_eq!(
            err,
            BillingError::InvalidTariff {
                price_per_hour: dec!(-1)
            }
        );
    }

    #[test]
    fn rate_above_maximum_rejected() {
        assert!(Tariff::new("Peak", MAX_RATE_PER_HOUR).is_ok());

        let err = Tariff::new("Runaway", Decimal::MAX).unwrap_err();
        assert!(matches!(err, BillingError::InvalidTariff { .. }));
        assert!(Tariff::new("Runaway", MAX_RATE_PER_HOUR + dec!(0.01)).is_err());
    }

    #[test]
    fn free_tariff_allowed() {
        let tariff = Tariff::new("Free", Decimal::ZERO).unwrap();
        assert!(tariff.price_per_hour.is_zero());
    }
}
