//! Venue domain - pricing venue abstraction and raw quote shapes

mod dex_interface;

pub use dex_interface::RateSource;

use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::shared::types::Direction;

/// How a venue models its prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueKind {
    /// Rate aggregator proxy answering with a scalar expected rate (Kyber).
    AggregatorProxy,
    /// Constant-product pool answering with an output amount (Uniswap V2).
    ConstantProduct,
}

impl VenueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueKind::AggregatorProxy => "aggregator proxy",
            VenueKind::ConstantProduct => "constant product",
        }
    }
}

/// Venue-specific answer to "what do I receive for this input".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawQuote {
    /// Expected rate with 18 decimals of precision, output per unit of input.
    ExpectedRate { direction: Direction, rate: U256 },
    /// Atomic input and output amounts.
    OutputAmount {
        direction: Direction,
        amount_in: U256,
        amount_out: U256,
    },
}

impl RawQuote {
    pub fn direction(&self) -> Direction {
        match self {
            RawQuote::ExpectedRate { direction, .. } => *direction,
            RawQuote::OutputAmount { direction, .. } => *direction,
        }
    }
}
