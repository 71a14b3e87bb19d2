use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::dex::{RateSource, RawQuote, VenueKind};
use crate::math::constant_product_output;
use crate::shared::errors::{AppError, ScanError};
use crate::shared::types::{Direction, Trigger};
use super::contracts::UniswapV2Pair;

/// Reserves of the pair, already ordered as base/quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub reserve_base: U256,
    pub reserve_quote: U256,
    pub fetched_at_block: u64,
}

impl PoolSnapshot {
    /// Output of swapping `amount_in` against this snapshot.
    pub fn output_amount(&self, direction: Direction, amount_in: U256) -> Option<U256> {
        match direction {
            Direction::Buy => constant_product_output(amount_in, self.reserve_quote, self.reserve_base),
            Direction::Sell => constant_product_output(amount_in, self.reserve_base, self.reserve_quote),
        }
    }
}

/// Constant-product venue over a Uniswap V2 pair.
///
/// Reserves are read into a snapshot at startup and quotes are computed
/// locally against it. With `refresh_every_blocks > 0` the snapshot is
/// re-read once it is that many blocks old; with 0 it is never re-read.
pub struct UniswapV2Adapter<M: Middleware> {
    name: String,
    pair: UniswapV2Pair<M>,
    base_is_token0: bool,
    refresh_every_blocks: u64,
    snapshot: RwLock<PoolSnapshot>,
}

impl<M: Middleware + 'static> UniswapV2Adapter<M> {
    /// Bind to the pair and fetch the initial snapshot.
    pub async fn connect(
        name: impl Into<String>,
        client: Arc<M>,
        pair_address: Address,
        base_token: Address,
        quote_token: Address,
        refresh_every_blocks: u64,
    ) -> Result<Self, AppError> {
        let name = name.into();
        let pair = UniswapV2Pair::new(pair_address, Arc::clone(&client));

        let token0 = pair
            .token_0()
            .call()
            .await
            .map_err(|e| AppError::BlockchainError(format!("{}: token0() failed: {}", name, e)))?;
        let base_is_token0 = if token0 == base_token {
            true
        } else if token0 == quote_token {
            false
        } else {
            return Err(AppError::ConfigError(format!(
                "pair {:?} does not trade base {:?} against quote {:?}",
                pair_address, base_token, quote_token
            )));
        };

        let block = client
            .get_block_number()
            .await
            .map_err(|e| AppError::BlockchainError(format!("{}: block number unavailable: {}", name, e)))?
            .as_u64();

        let adapter = Self::from_parts(name, pair, base_is_token0, refresh_every_blocks, PoolSnapshot {
            reserve_base: U256::zero(),
            reserve_quote: U256::zero(),
            fetched_at_block: block,
        });
        let snapshot = adapter.fetch_snapshot(block).await.map_err(AppError::from)?;
        info!(
            "✅ {} pair loaded at block {}: reserves {} base / {} quote",
            adapter.name, block, snapshot.reserve_base, snapshot.reserve_quote
        );
        *adapter.snapshot.write().await = snapshot;

        Ok(adapter)
    }

    pub fn from_parts(
        name: String,
        pair: UniswapV2Pair<M>,
        base_is_token0: bool,
        refresh_every_blocks: u64,
        snapshot: PoolSnapshot,
    ) -> Self {
        Self {
            name,
            pair,
            base_is_token0,
            refresh_every_blocks,
            snapshot: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> PoolSnapshot {
        *self.snapshot.read().await
    }

    async fn fetch_snapshot(&self, block: u64) -> Result<PoolSnapshot, ScanError> {
        let (reserve0, reserve1, _timestamp) = self
            .pair
            .get_reserves()
            .call()
            .await
            .map_err(|e| ScanError::venue_unavailable(&self.name, e))?;

        let (reserve_base, reserve_quote) = if self.base_is_token0 {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };

        Ok(PoolSnapshot {
            reserve_base: U256::from(reserve_base),
            reserve_quote: U256::from(reserve_quote),
            fetched_at_block: block,
        })
    }
}

#[async_trait]
impl<M: Middleware + 'static> RateSource for UniswapV2Adapter<M> {
    fn kind(&self) -> VenueKind {
        VenueKind::ConstantProduct
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn quote(&self, direction: Direction, amount: U256) -> Result<RawQuote, ScanError> {
        let snapshot = self.snapshot().await;
        let amount_out = snapshot
            .output_amount(direction, amount)
            .ok_or_else(|| ScanError::venue_unavailable(&self.name, "no liquidity for requested input"))?;

        Ok(RawQuote::OutputAmount {
            direction,
            amount_in: amount,
            amount_out,
        })
    }

    async fn refresh(&self, trigger: Trigger) -> Result<(), ScanError> {
        if self.refresh_every_blocks == 0 {
            return Ok(());
        }

        let fetched_at = self.snapshot().await.fetched_at_block;
        if trigger.sequence < fetched_at.saturating_add(self.refresh_every_blocks) {
            return Ok(());
        }

        let snapshot = self.fetch_snapshot(trigger.sequence).await?;

        // overlapping cycles may finish their reads out of order
        let mut current = self.snapshot.write().await;
        if snapshot.fetched_at_block < current.fetched_at_block {
            debug!(
                "{} reserves for block {} discarded, already at block {}",
                self.name, trigger.sequence, current.fetched_at_block
            );
            return Ok(());
        }
        debug!(
            "{} reserves refreshed at block {}: {} base / {} quote",
            self.name, trigger.sequence, snapshot.reserve_base, snapshot.reserve_quote
        );
        *current = snapshot;
        Ok(())
    }
}
