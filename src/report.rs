// src/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::arbitrage::ProfitCalculation;
use crate::shared::types::{Opportunity, RatePair, TradeDirection};

/// Decision for one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportedOutcome {
    Opportunity(Opportunity),
    NoOpportunity,
}

impl ReportedOutcome {
    pub fn opportunity(&self) -> Option<&Opportunity> {
        match self {
            ReportedOutcome::Opportunity(opportunity) => Some(opportunity),
            ReportedOutcome::NoOpportunity => None,
        }
    }
}

/// Everything a scan looked at, for structured logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub sequence: u64,
    pub venue_a: VenueRates,
    pub venue_b: VenueRates,
    pub profits: ProfitCalculation,
    pub outcome: ReportedOutcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueRates {
    pub venue: String,
    pub rates: RatePair,
}

impl ScanReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Turns the two profit figures into a found/not-found decision and logs it.
#[derive(Debug, Clone)]
pub struct OpportunityReporter {
    venue_a: String,
    venue_b: String,
    base_symbol: String,
    quote_symbol: String,
}

impl OpportunityReporter {
    pub fn new(
        venue_a: impl Into<String>,
        venue_b: impl Into<String>,
        base_symbol: impl Into<String>,
        quote_symbol: impl Into<String>,
    ) -> Self {
        Self {
            venue_a: venue_a.into(),
            venue_b: venue_b.into(),
            base_symbol: base_symbol.into(),
            quote_symbol: quote_symbol.into(),
        }
    }

    /// A->B is checked first, so when both directions are profitable only A->B
    /// is reported. Zero profit is not an opportunity.
    pub fn decide(
        &self,
        profit_a_to_b: f64,
        profit_b_to_a: f64,
        venue_a: &RatePair,
        venue_b: &RatePair,
    ) -> ReportedOutcome {
        if profit_a_to_b > 0.0 {
            ReportedOutcome::Opportunity(Opportunity {
                direction: TradeDirection::AToB,
                buy_venue: self.venue_a.clone(),
                sell_venue: self.venue_b.clone(),
                buy_price: venue_a.buy,
                sell_price: venue_b.sell,
                expected_profit: profit_a_to_b,
            })
        } else if profit_b_to_a > 0.0 {
            ReportedOutcome::Opportunity(Opportunity {
                direction: TradeDirection::BToA,
                buy_venue: self.venue_b.clone(),
                sell_venue: self.venue_a.clone(),
                buy_price: venue_b.buy,
                sell_price: venue_a.sell,
                expected_profit: profit_b_to_a,
            })
        } else {
            ReportedOutcome::NoOpportunity
        }
    }

    /// Decide and emit the human-readable log lines.
    pub fn report(
        &self,
        profit_a_to_b: f64,
        profit_b_to_a: f64,
        venue_a: &RatePair,
        venue_b: &RatePair,
    ) -> ReportedOutcome {
        let outcome = self.decide(profit_a_to_b, profit_b_to_a, venue_a, venue_b);
        match &outcome {
            ReportedOutcome::Opportunity(opportunity) => {
                info!("💰 Arb opportunity found!");
                info!(
                    "   Buy {} on {} at {:.6} {}",
                    self.base_symbol, opportunity.buy_venue, opportunity.buy_price, self.quote_symbol
                );
                info!(
                    "   Sell {} on {} at {:.6} {}",
                    self.base_symbol, opportunity.sell_venue, opportunity.sell_price, self.quote_symbol
                );
                info!("   Expected profit: {:.6} {}", opportunity.expected_profit, self.quote_symbol);
            }
            ReportedOutcome::NoOpportunity => {
                info!("Arb not found");
            }
        }
        outcome
    }

    pub fn log_rates(&self, venue_a: &RatePair, venue_b: &RatePair) {
        info!("{} {}/{}: {}", self.venue_a, self.base_symbol, self.quote_symbol, venue_a);
        info!("{} {}/{}: {}", self.venue_b, self.base_symbol, self.quote_symbol, venue_b);
    }

    pub fn scan_report(
        &self,
        sequence: u64,
        venue_a: RatePair,
        venue_b: RatePair,
        profits: ProfitCalculation,
        outcome: ReportedOutcome,
    ) -> ScanReport {
        let report = ScanReport {
            sequence,
            venue_a: VenueRates { venue: self.venue_a.clone(), rates: venue_a },
            venue_b: VenueRates { venue: self.venue_b.clone(), rates: venue_b },
            profits,
            outcome,
            timestamp: Utc::now(),
        };
        if let Ok(json) = report.to_json() {
            debug!("Scan report: {}", json);
        }
        report
    }
}
