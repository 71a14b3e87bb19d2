// src/math.rs
use ethers::types::U256;

/// Uniswap V2 swap fee: 0.3%, expressed as the retained share out of 1000.
pub const CONSTANT_PRODUCT_FEE_NUMERATOR: u64 = 997;
pub const CONSTANT_PRODUCT_FEE_DENOMINATOR: u64 = 1000;

/// Output amount of a constant-product pool for a given input, fee included:
/// `out = in * 997 * reserve_out / (reserve_in * 1000 + in * 997)`.
///
/// Returns `None` for an empty pool, a zero input, overflow, or an output that
/// rounds down to nothing.
pub fn constant_product_output(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return None;
    }

    let amount_in_with_fee = amount_in.checked_mul(U256::from(CONSTANT_PRODUCT_FEE_NUMERATOR))?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
    let denominator = reserve_in
        .checked_mul(U256::from(CONSTANT_PRODUCT_FEE_DENOMINATOR))?
        .checked_add(amount_in_with_fee)?;

    let amount_out = numerator / denominator;
    if amount_out.is_zero() {
        None
    } else {
        Some(amount_out)
    }
}

/// Midpoint of two prices
pub fn midpoint(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_product_output() {
        // 10 in against 1000/1000: 10*997*1000 / (1000*1000 + 10*997) = 9970000 / 1009970
        let out = constant_product_output(U256::from(10u64), U256::from(1000u64), U256::from(1000u64));
        assert_eq!(out, Some(U256::from(9u64)));

        let out = constant_product_output(
            U256::from(1_000_000u64),
            U256::from(1_000_000_000u64),
            U256::from(2_000_000_000u64),
        );
        // 1e6*997*2e9 / (1e9*1000 + 997e6) = 1994e15 / 1000997e6
        assert_eq!(out, Some(U256::from(1_992_013u64)));
    }

    #[test]
    fn test_constant_product_rejects_empty_pool() {
        assert_eq!(constant_product_output(U256::from(10u64), U256::zero(), U256::from(1000u64)), None);
        assert_eq!(constant_product_output(U256::from(10u64), U256::from(1000u64), U256::zero()), None);
        assert_eq!(constant_product_output(U256::zero(), U256::from(1000u64), U256::from(1000u64)), None);
    }

    #[test]
    fn test_constant_product_dust_output() {
        assert_eq!(constant_product_output(U256::from(1u64), U256::from(1_000_000u64), U256::from(10u64)), None);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint(228.0, 232.0), 230.0);
    }
}
