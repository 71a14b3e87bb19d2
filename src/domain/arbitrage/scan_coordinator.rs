//! One trigger-driven scan cycle: fetch, normalize, estimate, decide

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::domain::dex::{RateSource, RawQuote};
use crate::domain::gas::GasEstimator;
use crate::domain::price::RateNormalizer;
use crate::report::{OpportunityReporter, ReportedOutcome};
use crate::shared::errors::ScanError;
use crate::shared::types::{AmountBasis, Direction, GasCost, RatePair, Trigger};
use super::profit_calculator::ProfitCalculator;

/// States a cycle passes through. A failure in any state returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Fetching,
    Normalizing,
    Estimating,
    Deciding,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Reported(ReportedOutcome),
    /// A newer cycle already reported; only produced when supersession is on.
    Superseded,
    Failed(ScanError),
}

/// Result of one cycle, tagged with the trigger that started it.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    pub sequence: u64,
    pub outcome: CycleOutcome,
}

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub cycle_timeout: Duration,
    pub supersede_stale_cycles: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            cycle_timeout: Duration::from_secs(10),
            supersede_stale_cycles: false,
        }
    }
}

/// Orchestrates scan cycles over venue A (bought on first) and venue B.
///
/// Cycles share nothing mutable apart from the supersession watermark, so
/// overlapping triggers may run concurrently on the same coordinator.
pub struct ScanCoordinator {
    venue_a: Arc<dyn RateSource>,
    venue_b: Arc<dyn RateSource>,
    basis: AmountBasis,
    normalizer: RateNormalizer,
    gas: GasEstimator,
    calculator: ProfitCalculator,
    reporter: OpportunityReporter,
    config: CoordinatorConfig,
    latest_reported: AtomicU64,
}

impl ScanCoordinator {
    pub fn new(
        venue_a: Arc<dyn RateSource>,
        venue_b: Arc<dyn RateSource>,
        basis: AmountBasis,
        normalizer: RateNormalizer,
        gas: GasEstimator,
        reporter: OpportunityReporter,
        config: CoordinatorConfig,
    ) -> Self {
        let calculator = ProfitCalculator::new(basis.base_amount);
        Self {
            venue_a,
            venue_b,
            basis,
            normalizer,
            gas,
            calculator,
            reporter,
            config,
            latest_reported: AtomicU64::new(0),
        }
    }

    /// Run a full cycle for `trigger`. Never fails: errors and timeouts are
    /// logged and returned as `CycleOutcome::Failed`.
    pub async fn run_cycle(&self, trigger: Trigger) -> CycleResult {
        let started = Instant::now();
        info!("🧱 New block received. Block # {}", trigger.sequence);

        let outcome = match tokio::time::timeout(self.config.cycle_timeout, self.scan(trigger)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!("❌ Scan for block {} abandoned: {}", trigger.sequence, err);
                CycleOutcome::Failed(err)
            }
            Err(_) => {
                let err = ScanError::CycleTimedOut(self.config.cycle_timeout);
                warn!("❌ Scan for block {} abandoned: {}", trigger.sequence, err);
                CycleOutcome::Failed(err)
            }
        };

        self.enter(trigger, ScanState::Idle);
        debug!("Cycle for block {} finished in {:?}", trigger.sequence, started.elapsed());

        CycleResult {
            sequence: trigger.sequence,
            outcome,
        }
    }

    async fn scan(&self, trigger: Trigger) -> Result<CycleOutcome, ScanError> {
        self.enter(trigger, ScanState::Fetching);
        self.refresh_venues(trigger).await;
        let [a_buy, a_sell, b_buy, b_sell] = self.fetch_quotes().await?;

        self.enter(trigger, ScanState::Normalizing);
        let rates_a = self
            .normalizer
            .normalize(self.venue_a.name(), self.venue_a.kind(), [a_buy, a_sell])?;
        let rates_b = self
            .normalizer
            .normalize(self.venue_b.name(), self.venue_b.kind(), [b_buy, b_sell])?;
        self.reporter.log_rates(&rates_a, &rates_b);

        self.enter(trigger, ScanState::Estimating);
        let gas = self.gas.estimate().await?;

        self.enter(trigger, ScanState::Deciding);
        Ok(self.decide(trigger, rates_a, rates_b, &gas))
    }

    fn decide(
        &self,
        trigger: Trigger,
        rates_a: RatePair,
        rates_b: RatePair,
        gas: &GasCost,
    ) -> CycleOutcome {
        let reference_price = ProfitCalculator::reference_price(&rates_a, &rates_b);
        let profits = self.calculator.compute(&rates_a, &rates_b, gas, reference_price);
        debug!(
            "Block {}: profit A->B = {:.6}, profit B->A = {:.6}, gas = {:.6}",
            trigger.sequence, profits.profit_a_to_b, profits.profit_b_to_a, profits.gas_cost_quote
        );

        if self.config.supersede_stale_cycles {
            let newest = self.latest_reported.fetch_max(trigger.sequence, Ordering::SeqCst);
            if newest > trigger.sequence {
                debug!("Block {} superseded by block {}, result dropped", trigger.sequence, newest);
                return CycleOutcome::Superseded;
            }
        }

        let outcome = self
            .reporter
            .report(profits.profit_a_to_b, profits.profit_b_to_a, &rates_a, &rates_b);
        self.reporter
            .scan_report(trigger.sequence, rates_a, rates_b, profits, outcome.clone());

        CycleOutcome::Reported(outcome)
    }

    async fn refresh_venues(&self, trigger: Trigger) {
        let (a, b) = tokio::join!(self.venue_a.refresh(trigger), self.venue_b.refresh(trigger));
        for (venue, result) in [(self.venue_a.name(), a), (self.venue_b.name(), b)] {
            if let Err(err) = result {
                warn!("⚠️  {} refresh failed, keeping previous state: {}", venue, err);
            }
        }
    }

    /// All four quotes are issued together; the first failure aborts the rest.
    async fn fetch_quotes(&self) -> Result<[RawQuote; 4], ScanError> {
        let buy_amount = self.basis.amount_for(Direction::Buy);
        let sell_amount = self.basis.amount_for(Direction::Sell);

        let (a_buy, a_sell, b_buy, b_sell) = tokio::try_join!(
            self.venue_a.quote(Direction::Buy, buy_amount),
            self.venue_a.quote(Direction::Sell, sell_amount),
            self.venue_b.quote(Direction::Buy, buy_amount),
            self.venue_b.quote(Direction::Sell, sell_amount),
        )?;

        Ok([a_buy, a_sell, b_buy, b_sell])
    }

    fn enter(&self, trigger: Trigger, state: ScanState) {
        trace!("Block {} -> {:?}", trigger.sequence, state);
    }
}
