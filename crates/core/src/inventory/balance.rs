//! Per-item-per-warehouse stock balance.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept on quantities and values.
pub const VALUE_DP: u32 = 4;

/// Decimal places kept on average unit costs.
pub const COST_DP: u32 = 6;

/// Rounds a value amount with banker's rounding.
#[must_use]
pub fn round_value(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(VALUE_DP, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a unit cost with banker's rounding.
#[must_use]
pub fn round_cost(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(COST_DP, RoundingStrategy::MidpointNearestEven)
}

/// Current stock balance for one item in one warehouse.
///
/// A balance with zero quantity retains its average cost (cost memory);
/// an absent row has no cost memory. The `version` counts movements applied
/// to this pair and orders the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBalance {
    /// Quantity on hand. Never negative.
    pub quantity: Decimal,
    /// Total value on hand. Never negative.
    pub total_value: Decimal,
    /// Average unit cost.
    pub avg_unit_cost: Decimal,
    /// Number of movements applied (monotonically increasing).
    pub version: i64,
}

impl StockBalance {
    /// The balance before any movement exists (absent row equivalent).
    #[must_use]
    pub fn opening() -> Self {
        Self {
            quantity: Decimal::ZERO,
            total_value: Decimal::ZERO,
            avg_unit_cost: Decimal::ZERO,
            version: 0,
        }
    }

    /// Returns true if no stock is on hand.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Checks the value-consistency invariant `total_value == quantity *
    /// avg_unit_cost` within rounding tolerance.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let expected = round_value(self.quantity * self.avg_unit_cost);
        (self.total_value - expected).abs() <= consistency_tolerance(self.quantity)
    }
}

/// Tolerance allowed between `total_value` and `quantity * avg_unit_cost`:
/// the average cost is rounded to `COST_DP` places, so the product can be
/// off by up to half a cost unit per unit of quantity, plus one value unit.
fn consistency_tolerance(quantity: Decimal) -> Decimal {
    quantity.abs() * Decimal::new(5, COST_DP + 1) + Decimal::new(1, VALUE_DP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_opening_balance_is_empty() {
        let balance = StockBalance::opening();
        assert!(balance.is_empty());
        assert_eq!(balance.version, 0);
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_consistent_balance() {
        let balance = StockBalance {
            quantity: dec!(100),
            total_value: dec!(1000),
            avg_unit_cost: dec!(10),
            version: 1,
        };
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_inconsistent_balance() {
        let balance = StockBalance {
            quantity: dec!(100),
            total_value: dec!(900),
            avg_unit_cost: dec!(10),
            version: 1,
        };
        assert!(!balance.is_consistent());
    }

    #[test]
    fn test_zero_quantity_retains_cost_memory() {
        let balance = StockBalance {
            quantity: dec!(0),
            total_value: dec!(0),
            avg_unit_cost: dec!(12.5),
            version: 7,
        };
        assert!(balance.is_empty());
        assert!(balance.is_consistent());
        assert_eq!(balance.avg_unit_cost, dec!(12.5));
    }

    #[test]
    fn test_round_value_bankers() {
        assert_eq!(round_value(dec!(1.00005)), dec!(1.0000));
        assert_eq!(round_value(dec!(1.00015)), dec!(1.0002));
    }
}
