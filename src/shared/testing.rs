//! In-memory venues and gas oracles for unit tests

use async_trait::async_trait;
use ethers::types::U256;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::dex::{RateSource, RawQuote, VenueKind};
use crate::domain::gas::GasOracle;
use crate::shared::errors::ScanError;
use crate::shared::types::{AmountBasis, Direction, Trigger};

pub fn wei(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

/// Aggregator rate for the quote -> base call that normalizes to `price`.
pub fn rate_for_buy_price(price: f64) -> U256 {
    U256::from((1e18 / price).round() as u128)
}

/// 100 base at a reference price of 230, both assets with 18 decimals.
pub fn test_basis() -> AmountBasis {
    AmountBasis::new(100.0, 230.0, 18, 18).unwrap()
}

pub struct MockVenue {
    name: String,
    kind: VenueKind,
    buy: RawQuote,
    sell: RawQuote,
    delay: Option<Duration>,
    sell_failures_remaining: AtomicUsize,
    pub quote_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

impl MockVenue {
    /// Aggregator venue buying base at `buy_price` and selling at `sell_price`.
    pub fn aggregator(name: &str, buy_price: f64, sell_price: u64) -> Self {
        Self::new(
            name,
            VenueKind::AggregatorProxy,
            RawQuote::ExpectedRate { direction: Direction::Buy, rate: rate_for_buy_price(buy_price) },
            RawQuote::ExpectedRate { direction: Direction::Sell, rate: wei(sell_price) },
        )
    }

    /// Pool venue quoted with `basis`, returning `base_out` for the quote
    /// notional and `quote_out` for the base notional (whole units).
    pub fn pool(name: &str, basis: &AmountBasis, base_out: u64, quote_out: u64) -> Self {
        Self::new(
            name,
            VenueKind::ConstantProduct,
            RawQuote::OutputAmount {
                direction: Direction::Buy,
                amount_in: basis.quote_atomic,
                amount_out: wei(base_out),
            },
            RawQuote::OutputAmount {
                direction: Direction::Sell,
                amount_in: basis.base_atomic,
                amount_out: wei(quote_out),
            },
        )
    }

    fn new(name: &str, kind: VenueKind, buy: RawQuote, sell: RawQuote) -> Self {
        Self {
            name: name.to_string(),
            kind,
            buy,
            sell,
            delay: None,
            sell_failures_remaining: AtomicUsize::new(0),
            quote_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the next `count` sell quotes.
    pub fn failing_sells(self, count: usize) -> Self {
        self.sell_failures_remaining.store(count, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl RateSource for MockVenue {
    fn kind(&self) -> VenueKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn quote(&self, direction: Direction, _amount: U256) -> Result<RawQuote, ScanError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match direction {
            Direction::Buy => Ok(self.buy),
            Direction::Sell => {
                let failing = self
                    .sell_failures_remaining
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok();
                if failing {
                    Err(ScanError::venue_unavailable(&self.name, "connection reset"))
                } else {
                    Ok(self.sell)
                }
            }
        }
    }

    async fn refresh(&self, _trigger: Trigger) -> Result<(), ScanError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FixedGasOracle(pub U256);

#[async_trait]
impl GasOracle for FixedGasOracle {
    async fn gas_price(&self) -> Result<U256, ScanError> {
        Ok(self.0)
    }
}

pub struct FailingGasOracle;

#[async_trait]
impl GasOracle for FailingGasOracle {
    async fn gas_price(&self) -> Result<U256, ScanError> {
        Err(ScanError::GasQueryFailed("eth_gasPrice timed out".to_string()))
    }
}

/// Counts queries and answers with a fixed price.
#[derive(Default)]
pub struct CountingGasOracle {
    pub calls: AtomicUsize,
}

#[async_trait]
impl GasOracle for CountingGasOracle {
    async fn gas_price(&self) -> Result<U256, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(U256::from(20_000_000_000u64))
    }
}
