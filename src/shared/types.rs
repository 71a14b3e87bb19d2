//! Common types used across the application

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::errors::AppError;
use crate::shared::utils::{atomic_to_whole, whole_to_atomic, NATIVE_DECIMALS};

/// A new-block notification. The block number identifies the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Trigger {
    pub sequence: u64,
}

impl Trigger {
    pub fn new(sequence: u64) -> Self {
        Self { sequence }
    }
}

/// Side of a venue quote, seen from the base asset.
/// `Buy` spends the quote asset to receive base, `Sell` spends base to receive quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

/// Token representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// Fixed notional trade size, expressed once in base units and once in quote
/// units. Both sides describe the same economic size at setup time and are
/// never re-derived per scan.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountBasis {
    pub base_amount: f64,
    pub quote_amount: f64,
    pub base_atomic: U256,
    pub quote_atomic: U256,
}

impl AmountBasis {
    pub fn new(
        base_amount: f64,
        reference_price: f64,
        base_decimals: u8,
        quote_decimals: u8,
    ) -> Result<Self, AppError> {
        if !(base_amount > 0.0) || !(reference_price > 0.0) {
            return Err(AppError::ConfigError(format!(
                "trade amount and reference price must be positive (amount={}, price={})",
                base_amount, reference_price
            )));
        }

        let quote_amount = base_amount * reference_price;
        let base_atomic = whole_to_atomic(base_amount, base_decimals).ok_or_else(|| {
            AppError::ConfigError(format!("cannot scale {} to {} decimals", base_amount, base_decimals))
        })?;
        let quote_atomic = whole_to_atomic(quote_amount, quote_decimals).ok_or_else(|| {
            AppError::ConfigError(format!("cannot scale {} to {} decimals", quote_amount, quote_decimals))
        })?;

        if base_atomic.is_zero() || quote_atomic.is_zero() {
            return Err(AppError::ConfigError(format!(
                "trade size rounds to zero atomic units (base={}, quote={})",
                base_atomic, quote_atomic
            )));
        }

        Ok(Self {
            base_amount,
            quote_amount,
            base_atomic,
            quote_atomic,
        })
    }

    /// Input amount a venue is quoted with for the given direction.
    pub fn amount_for(&self, direction: Direction) -> U256 {
        match direction {
            Direction::Buy => self.quote_atomic,
            Direction::Sell => self.base_atomic,
        }
    }
}

/// Normalized buy/sell prices of one venue, in quote per base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePair {
    pub buy: f64,
    pub sell: f64,
}

impl fmt::Display for RatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buy={:.6} sell={:.6}", self.buy, self.sell)
    }
}

/// Transaction cost estimate: live gas price times a static unit count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasCost {
    pub unit_price: U256,
    pub assumed_units: u64,
}

impl GasCost {
    pub fn total_wei(&self) -> U256 {
        self.unit_price.saturating_mul(U256::from(self.assumed_units))
    }

    /// Cost in whole native units (ether).
    pub fn native_cost(&self) -> f64 {
        atomic_to_whole(self.total_wei(), NATIVE_DECIMALS).unwrap_or(f64::INFINITY)
    }
}

/// Which way round the two venues are traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Buy on venue A, sell on venue B
    AToB,
    /// Buy on venue B, sell on venue A
    BToA,
}

/// A currently profitable buy-here/sell-there condition, net of gas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub direction: TradeDirection,
    pub buy_venue: String,
    pub sell_venue: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub expected_profit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_basis_derivation() {
        let basis = AmountBasis::new(100.0, 230.0, 18, 18).unwrap();
        assert_eq!(basis.quote_amount, 23_000.0);
        assert_eq!(basis.base_atomic, U256::from(100u64) * U256::exp10(18));
        assert_eq!(basis.quote_atomic, U256::from(23_000u64) * U256::exp10(18));
        assert_eq!(basis.amount_for(Direction::Buy), basis.quote_atomic);
        assert_eq!(basis.amount_for(Direction::Sell), basis.base_atomic);
    }

    #[test]
    fn test_amount_basis_respects_decimals() {
        let basis = AmountBasis::new(2.0, 1500.0, 18, 6).unwrap();
        assert_eq!(basis.quote_atomic, U256::from(3_000_000_000u64));
    }

    #[test]
    fn test_amount_basis_rejects_non_positive() {
        assert!(AmountBasis::new(0.0, 230.0, 18, 18).is_err());
        assert!(AmountBasis::new(100.0, -1.0, 18, 18).is_err());
    }

    #[test]
    fn test_amount_basis_rejects_sub_atomic_size() {
        assert!(matches!(AmountBasis::new(1e-20, 230.0, 18, 18), Err(AppError::ConfigError(_))));
        // 1e-7 quote is below one unit at 6 decimals
        assert!(matches!(AmountBasis::new(1e-9, 100.0, 18, 6), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_gas_cost_native() {
        let gas = GasCost {
            unit_price: U256::from(50_000_000_000u64), // 50 gwei
            assumed_units: 200_000,
        };
        assert_eq!(gas.total_wei(), U256::from(10_000_000_000_000_000u64));
        assert!((gas.native_cost() - 0.01).abs() < 1e-12);
    }
}
