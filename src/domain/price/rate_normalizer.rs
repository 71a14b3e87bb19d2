//! Conversion of raw venue quotes into comparable buy/sell prices

use tracing::debug;

use crate::domain::dex::{RawQuote, VenueKind};
use crate::shared::errors::ScanError;
use crate::shared::types::{Direction, RatePair};
use crate::shared::utils::atomic_to_whole;

/// Aggregator rates are always fixed-point with 18 decimals.
pub const AGGREGATOR_RATE_DECIMALS: u8 = 18;

/// Turns a venue's pair of raw quotes into a `RatePair` in quote per base.
#[derive(Debug, Clone)]
pub struct RateNormalizer {
    base_decimals: u8,
    quote_decimals: u8,
}

impl RateNormalizer {
    pub fn new(base_decimals: u8, quote_decimals: u8) -> Self {
        Self {
            base_decimals,
            quote_decimals,
        }
    }

    /// `quotes` holds the buy-direction quote followed by the sell-direction quote.
    pub fn normalize(
        &self,
        venue: &str,
        kind: VenueKind,
        quotes: [RawQuote; 2],
    ) -> Result<RatePair, ScanError> {
        let [buy_quote, sell_quote] = quotes;
        if buy_quote.direction() != Direction::Buy || sell_quote.direction() != Direction::Sell {
            return Err(ScanError::venue_unavailable(venue, "quotes out of order"));
        }

        let rates = match kind {
            VenueKind::AggregatorProxy => self.normalize_aggregator(venue, buy_quote, sell_quote)?,
            VenueKind::ConstantProduct => self.normalize_pool(venue, buy_quote, sell_quote)?,
        };

        debug!("{} ({}) normalized: {}", venue, kind.as_str(), rates);
        Ok(rates)
    }

    fn normalize_aggregator(
        &self,
        venue: &str,
        buy_quote: RawQuote,
        sell_quote: RawQuote,
    ) -> Result<RatePair, ScanError> {
        let (RawQuote::ExpectedRate { rate: buy_rate, .. }, RawQuote::ExpectedRate { rate: sell_rate, .. }) =
            (buy_quote, sell_quote)
        else {
            return Err(ScanError::venue_unavailable(venue, "expected aggregator rate quotes"));
        };

        // The buy call answers in base per quote; invert it.
        let base_per_quote = to_whole(venue, buy_rate, AGGREGATOR_RATE_DECIMALS)?;
        let buy = checked_price(venue, 1.0 / base_per_quote)?;
        let sell = checked_price(venue, to_whole(venue, sell_rate, AGGREGATOR_RATE_DECIMALS)?)?;

        Ok(RatePair { buy, sell })
    }

    fn normalize_pool(
        &self,
        venue: &str,
        buy_quote: RawQuote,
        sell_quote: RawQuote,
    ) -> Result<RatePair, ScanError> {
        let (
            RawQuote::OutputAmount { amount_in: quote_in, amount_out: base_out, .. },
            RawQuote::OutputAmount { amount_in: base_in, amount_out: quote_out, .. },
        ) = (buy_quote, sell_quote)
        else {
            return Err(ScanError::venue_unavailable(venue, "expected pool output quotes"));
        };

        let quote_in = to_whole(venue, quote_in, self.quote_decimals)?;
        let base_out = to_whole(venue, base_out, self.base_decimals)?;
        let base_in = to_whole(venue, base_in, self.base_decimals)?;
        let quote_out = to_whole(venue, quote_out, self.quote_decimals)?;

        let buy = checked_price(venue, quote_in / base_out)?;
        let sell = checked_price(venue, quote_out / base_in)?;

        Ok(RatePair { buy, sell })
    }
}

fn to_whole(venue: &str, amount: ethers::types::U256, decimals: u8) -> Result<f64, ScanError> {
    match atomic_to_whole(amount, decimals) {
        Some(value) if value > 0.0 => Ok(value),
        Some(_) => Err(ScanError::venue_unavailable(venue, "zero liquidity")),
        None => Err(ScanError::venue_unavailable(venue, format!("unrepresentable amount {}", amount))),
    }
}

fn checked_price(venue: &str, price: f64) -> Result<f64, ScanError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ScanError::venue_unavailable(venue, format!("non-economic price {}", price)))
    }
}
