//! Loyalty account types for parkease.

use serde::{Deserialize, Serialize};

use crate::Plate;

/// A per-plate redeemable point balance.
///
/// Accounts are global: a plate earns and spends points at every branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    /// The vehicle plate (unique key).
    pub plate: Plate,

    /// Accumulated points.
    pub points: u64,
}

impl LoyaltyAccount {
    /// Create an account with the given balance.
    #[must_use]
    pub fn new(plate: Plate, points: u64) -> Self {
        Self { plate, points }
    }

    /// Points available for a plate, treating a missing account as empty.
    #[must_use]
    pub fn available(account: Option<&Self>) -> u64 {
        account.map_or(0, |a| a.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_account_has_no_points() {
        assert_eq!(LoyaltyAccount::available(None), 0);

        let account = LoyaltyAccount::new("ABC-123".parse().unwrap(), 150);
        assert_eq!(LoyaltyAccount::available(Some(&account)), 150);
    }
}
