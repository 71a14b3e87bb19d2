//! Price domain - normalization of venue quotes

mod rate_normalizer;

pub use rate_normalizer::{RateNormalizer, AGGREGATOR_RATE_DECIMALS};
