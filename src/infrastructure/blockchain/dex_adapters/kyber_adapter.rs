use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::types::{Address, H160, U256};
use std::sync::Arc;
use tracing::debug;

use crate::domain::dex::{RateSource, RawQuote, VenueKind};
use crate::shared::errors::ScanError;
use crate::shared::types::Direction;
use super::contracts::KyberNetworkProxy;

/// Kyber's identifier for the chain's native asset.
pub const NATIVE_ASSET_SENTINEL: Address = H160([0xee; 20]);

/// Aggregator venue over a Kyber network proxy.
///
/// `getExpectedRate` is direction-specific, so every scan asks twice:
/// quote -> base for buying and base -> quote for selling.
pub struct KyberProxyAdapter<M: Middleware> {
    name: String,
    proxy: KyberNetworkProxy<M>,
    base_asset: Address,
    quote_asset: Address,
}

impl<M: Middleware + 'static> KyberProxyAdapter<M> {
    pub fn new(
        name: impl Into<String>,
        client: Arc<M>,
        proxy_address: Address,
        base_asset: Address,
        quote_asset: Address,
    ) -> Self {
        Self {
            name: name.into(),
            proxy: KyberNetworkProxy::new(proxy_address, client),
            base_asset,
            quote_asset,
        }
    }

    /// `(src, dest)` of the swap priced for `direction`.
    pub fn swap_assets(&self, direction: Direction) -> (Address, Address) {
        match direction {
            Direction::Buy => (self.quote_asset, self.base_asset),
            Direction::Sell => (self.base_asset, self.quote_asset),
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> RateSource for KyberProxyAdapter<M> {
    fn kind(&self) -> VenueKind {
        VenueKind::AggregatorProxy
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn quote(&self, direction: Direction, amount: U256) -> Result<RawQuote, ScanError> {
        let (src, dest) = self.swap_assets(direction);
        let (expected_rate, _worst_rate) = self
            .proxy
            .get_expected_rate(src, dest, amount)
            .call()
            .await
            .map_err(|e| ScanError::venue_unavailable(&self.name, e))?;

        debug!("{} {:?} expected rate: {}", self.name, direction, expected_rate);
        Ok(RawQuote::ExpectedRate {
            direction,
            rate: expected_rate,
        })
    }
}
