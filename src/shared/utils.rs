//! Unit conversion helpers

use ethers::types::U256;
use ethers::utils::{format_units, parse_units};

/// Decimals of the chain's native asset (wei per ether).
pub const NATIVE_DECIMALS: u8 = 18;

/// Convert an atomic amount into whole units, e.g. wei -> ether.
pub fn atomic_to_whole(amount: U256, decimals: u8) -> Option<f64> {
    format_units(amount, decimals as u32)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
}

/// Convert whole units into an atomic amount, e.g. 100.0 ether -> 1e20 wei.
pub fn whole_to_atomic(amount: f64, decimals: u8) -> Option<U256> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    parse_units(amount.to_string(), decimals as u32).ok().map(U256::from)
}

/// Short form of an address for log lines.
pub fn format_address(address: &ethers::types::Address) -> String {
    let s = format!("{:?}", address);
    format!("{}...{}", &s[..6], &s[s.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_to_whole() {
        let one_and_half = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(atomic_to_whole(one_and_half, 18), Some(1.5));
        assert_eq!(atomic_to_whole(U256::from(2_500_000u64), 6), Some(2.5));
    }

    #[test]
    fn test_whole_to_atomic() {
        assert_eq!(
            whole_to_atomic(100.0, 18),
            Some(U256::from(100u64) * U256::exp10(18))
        );
        assert_eq!(
            whole_to_atomic(23000.0, 18),
            Some(U256::from(23_000u64) * U256::exp10(18))
        );
        assert_eq!(whole_to_atomic(-1.0, 18), None);
        assert_eq!(whole_to_atomic(f64::NAN, 18), None);
    }

    #[test]
    fn test_format_address() {
        let addr: ethers::types::Address = "0x6B175474E89094C44Da98b954EedeAC495271d0F".parse().unwrap();
        assert_eq!(format_address(&addr), "0x6b17...1d0f");
    }
}
