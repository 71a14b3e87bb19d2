//! blockarb - block-triggered arbitrage scanner
//! Compares a Kyber network proxy against a Uniswap V2 pair on every new block

pub mod app;
pub mod config;
pub mod math;
pub mod report;

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use domain::arbitrage::{ScanCoordinator, CycleResult};
pub use domain::dex::RateSource;
pub use application::TriggerSubscriber;
