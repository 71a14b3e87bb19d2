//! Venue interface trait

use async_trait::async_trait;
use ethers::types::U256;

use crate::shared::errors::ScanError;
use crate::shared::types::{Direction, Trigger};
use super::{RawQuote, VenueKind};

/// Common interface for the pricing venues.
///
/// Implementations are stateless per call: `quote` may be issued concurrently
/// from overlapping scan cycles.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn kind(&self) -> VenueKind;

    /// Human-readable venue name used in reports, e.g. "Kyber".
    fn name(&self) -> &str;

    /// Quote `amount` of the input asset for `direction`.
    /// Buy spends the quote asset, Sell spends the base asset.
    async fn quote(&self, direction: Direction, amount: U256) -> Result<RawQuote, ScanError>;

    /// Hook run at the start of every cycle, before any quote is issued.
    async fn refresh(&self, _trigger: Trigger) -> Result<(), ScanError> {
        Ok(())
    }
}
