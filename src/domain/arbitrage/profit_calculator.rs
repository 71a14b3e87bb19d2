//! Profit calculation for both trade directions

use serde::{Deserialize, Serialize};

use crate::math::midpoint;
use crate::shared::types::{GasCost, RatePair};

/// Net profit of both directions for one scan, in quote units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitCalculation {
    /// Buy on venue A, sell on venue B
    pub profit_a_to_b: f64,
    /// Buy on venue B, sell on venue A
    pub profit_b_to_a: f64,
    pub gas_cost_quote: f64,
    pub reference_price: f64,
}

/// Profit calculator for a fixed base-asset trade size
#[derive(Debug, Clone)]
pub struct ProfitCalculator {
    pub amount_base: f64,
}

impl ProfitCalculator {
    pub fn new(amount_base: f64) -> Self {
        Self { amount_base }
    }

    /// Price used to express the native gas cost in quote units: the midpoint
    /// of venue A's buy price and venue B's sell price.
    pub fn reference_price(venue_a: &RatePair, venue_b: &RatePair) -> f64 {
        midpoint(venue_a.buy, venue_b.sell)
    }

    pub fn compute(
        &self,
        venue_a: &RatePair,
        venue_b: &RatePair,
        gas: &GasCost,
        reference_price: f64,
    ) -> ProfitCalculation {
        let gas_cost_quote = gas.native_cost() * reference_price;
        let (profit_a_to_b, profit_b_to_a) = self.net_profits(venue_a, venue_b, gas_cost_quote);

        ProfitCalculation {
            profit_a_to_b,
            profit_b_to_a,
            gas_cost_quote,
            reference_price,
        }
    }

    /// Both directions, each evaluated on its own spread: `(a_to_b, b_to_a)`.
    pub fn net_profits(&self, venue_a: &RatePair, venue_b: &RatePair, gas_cost_quote: f64) -> (f64, f64) {
        let profit_a_to_b = self.amount_base * (venue_b.sell - venue_a.buy) - gas_cost_quote;
        let profit_b_to_a = self.amount_base * (venue_a.sell - venue_b.buy) - gas_cost_quote;
        (profit_a_to_b, profit_b_to_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    #[test]
    fn test_profit_formula() {
        let calculator = ProfitCalculator::new(100.0);
        let venue_a = RatePair { buy: 228.0, sell: 232.0 };
        let venue_b = RatePair { buy: 229.0, sell: 231.0 };

        let (profit1, profit2) = calculator.net_profits(&venue_a, &venue_b, 5.0);
        assert_eq!(profit1, 295.0);
        assert_eq!(profit2, 295.0);
    }

    #[test]
    fn test_directions_are_independent() {
        let calculator = ProfitCalculator::new(100.0);
        let venue_a = RatePair { buy: 228.0, sell: 229.0 };
        let venue_b = RatePair { buy: 233.0, sell: 231.0 };

        let (profit1, profit2) = calculator.net_profits(&venue_a, &venue_b, 5.0);
        assert_eq!(profit1, 295.0);
        assert_eq!(profit2, -405.0);
    }

    #[test]
    fn test_gas_converted_with_reference_price() {
        let calculator = ProfitCalculator::new(10.0);
        let venue_a = RatePair { buy: 228.0, sell: 232.0 };
        let venue_b = RatePair { buy: 229.0, sell: 232.0 };
        // 0.01 ether of gas
        let gas = GasCost {
            unit_price: U256::from(50_000_000_000u64),
            assumed_units: 200_000,
        };

        let reference = ProfitCalculator::reference_price(&venue_a, &venue_b);
        assert_eq!(reference, 230.0);

        let calc = calculator.compute(&venue_a, &venue_b, &gas, reference);
        assert!((calc.gas_cost_quote - 2.3).abs() < 1e-9);
        assert!((calc.profit_a_to_b - (40.0 - 2.3)).abs() < 1e-9);
        assert!((calc.profit_b_to_a - (30.0 - 2.3)).abs() < 1e-9);
        assert_eq!(calc.reference_price, 230.0);
    }
}
