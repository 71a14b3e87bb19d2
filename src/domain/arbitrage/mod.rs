//! Arbitrage domain - profit computation and the scan cycle

pub mod profit_calculator;
pub mod scan_coordinator;

pub use profit_calculator::{ProfitCalculation, ProfitCalculator};
pub use scan_coordinator::{CoordinatorConfig, CycleOutcome, CycleResult, ScanCoordinator, ScanState};
