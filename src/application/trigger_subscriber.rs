use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::domain::arbitrage::{CycleResult, ScanCoordinator};
use crate::shared::errors::StreamError;
use crate::shared::types::Trigger;

pub type TriggerStream = BoxStream<'static, Result<Trigger, StreamError>>;

/// Push-style source of new-block triggers.
///
/// Every call to `subscribe` opens a fresh subscription. The stream ends, or
/// yields an error, when the transport drops.
#[async_trait]
pub trait TriggerSource: Send + Sync {
    async fn subscribe(&self) -> Result<TriggerStream, StreamError>;
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Consecutive failed (re)subscriptions tolerated before giving up.
    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 10,
            reconnect_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberStats {
    pub start_time: Instant,
    pub triggers_received: u64,
    pub duplicates_skipped: u64,
    pub cycles_started: u64,
    pub reconnects: u64,
    pub last_sequence: Option<u64>,
}

impl SubscriberStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            triggers_received: 0,
            duplicates_skipped: 0,
            cycles_started: 0,
            reconnects: 0,
            last_sequence: None,
        }
    }

    pub fn print_summary(&self) {
        info!("📊 Trigger subscriber statistics:");
        info!("   Uptime: {:?}", self.start_time.elapsed());
        info!("   Triggers received: {}", self.triggers_received);
        info!("   Duplicates skipped: {}", self.duplicates_skipped);
        info!("   Scan cycles started: {}", self.cycles_started);
        info!("   Reconnects: {}", self.reconnects);
    }
}

impl Default for SubscriberStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one scan cycle per new trigger and keeps the subscription alive.
///
/// Each trigger is dispatched at most once, identified by its sequence number,
/// so a redelivery after a reconnect does not start a second cycle.
pub struct TriggerSubscriber<S: TriggerSource> {
    source: S,
    coordinator: Arc<ScanCoordinator>,
    config: SubscriberConfig,
    results: Option<mpsc::UnboundedSender<CycleResult>>,
    stats: Arc<RwLock<SubscriberStats>>,
}

impl<S: TriggerSource> TriggerSubscriber<S> {
    pub fn new(source: S, coordinator: Arc<ScanCoordinator>, config: SubscriberConfig) -> Self {
        Self {
            source,
            coordinator,
            config,
            results: None,
            stats: Arc::new(RwLock::new(SubscriberStats::new())),
        }
    }

    /// Forward every finished cycle's result to `sender`.
    pub fn with_results(mut self, sender: mpsc::UnboundedSender<CycleResult>) -> Self {
        self.results = Some(sender);
        self
    }

    pub fn stats_handle(&self) -> Arc<RwLock<SubscriberStats>> {
        Arc::clone(&self.stats)
    }

    /// Run until the trigger source is lost for good.
    ///
    /// Returns `StreamError::StreamDisconnected` once `max_reconnect_attempts`
    /// consecutive subscriptions have failed without delivering a trigger.
    pub async fn run(self) -> Result<(), StreamError> {
        let mut failed_attempts: u32 = 0;
        let mut last_error = String::new();
        let mut first_connect = true;

        loop {
            if !first_connect {
                self.stats.write().await.reconnects += 1;
            }
            first_connect = false;

            match self.source.subscribe().await {
                Ok(stream) => {
                    info!("🔗 Subscribed to new block headers");
                    let (delivered, error) = self.consume(stream).await;
                    if delivered > 0 {
                        failed_attempts = 0;
                    } else {
                        failed_attempts += 1;
                    }
                    last_error = error.unwrap_or_else(|| "subscription closed".to_string());
                    warn!("⚠️  Trigger stream dropped: {}", last_error);
                }
                Err(err) => {
                    failed_attempts += 1;
                    error!("❌ Failed to subscribe to trigger source: {}", err);
                    last_error = err.to_string();
                }
            }

            if failed_attempts >= self.config.max_reconnect_attempts {
                error!("❌ Giving up on trigger source after {} attempts", failed_attempts);
                self.stats.read().await.print_summary();
                return Err(StreamError::StreamDisconnected {
                    attempts: failed_attempts,
                    last_error,
                });
            }

            info!(
                "🔄 Reconnecting to trigger source in {:?} (attempt {}/{})",
                self.config.reconnect_delay,
                failed_attempts + 1,
                self.config.max_reconnect_attempts
            );
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    /// Dispatch triggers until the stream ends. Returns the number of new
    /// triggers dispatched and the error that ended the stream, if any.
    async fn consume(&self, mut stream: TriggerStream) -> (u64, Option<String>) {
        let mut delivered = 0;

        while let Some(item) = stream.next().await {
            match item {
                Ok(trigger) => {
                    if self.dispatch(trigger).await {
                        delivered += 1;
                    }
                }
                Err(err) => {
                    error!("❌ Trigger stream error: {}", err);
                    return (delivered, Some(err.to_string()));
                }
            }
        }

        (delivered, None)
    }

    async fn dispatch(&self, trigger: Trigger) -> bool {
        {
            let mut stats = self.stats.write().await;
            stats.triggers_received += 1;

            if let Some(last) = stats.last_sequence {
                if trigger.sequence <= last {
                    stats.duplicates_skipped += 1;
                    debug!("Block {} already scanned (latest {}), skipping", trigger.sequence, last);
                    return false;
                }
                if trigger.sequence > last + 1 {
                    warn!(
                        "⚠️  {} block(s) missed between {} and {}",
                        trigger.sequence - last - 1,
                        last,
                        trigger.sequence
                    );
                }
            }

            stats.last_sequence = Some(trigger.sequence);
            stats.cycles_started += 1;
        }

        let coordinator = Arc::clone(&self.coordinator);
        let results = self.results.clone();
        tokio::spawn(async move {
            let result = coordinator.run_cycle(trigger).await;
            if let Some(results) = results {
                let _ = results.send(result);
            }
        });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arbitrage::{CoordinatorConfig, CycleOutcome};
    use crate::domain::gas::{GasEstimator, DEFAULT_ASSUMED_GAS_UNITS};
    use crate::domain::price::RateNormalizer;
    use crate::report::OpportunityReporter;
    use crate::shared::testing::{test_basis, CountingGasOracle, MockVenue};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Each subscription replays one scripted session, then fails to connect.
    struct ScriptedSource {
        sessions: Mutex<VecDeque<Vec<Result<Trigger, StreamError>>>>,
    }

    impl ScriptedSource {
        fn new(sessions: Vec<Vec<Result<Trigger, StreamError>>>) -> Self {
            Self {
                sessions: Mutex::new(sessions.into()),
            }
        }
    }

    #[async_trait]
    impl TriggerSource for ScriptedSource {
        async fn subscribe(&self) -> Result<TriggerStream, StreamError> {
            let session = self.sessions.lock().unwrap().pop_front();
            match session {
                Some(items) => Ok(futures_util::stream::iter(items).boxed()),
                None => Err(StreamError::Transport("connection refused".to_string())),
            }
        }
    }

    fn blocks(numbers: &[u64]) -> Vec<Result<Trigger, StreamError>> {
        numbers.iter().map(|n| Ok(Trigger::new(*n))).collect()
    }

    fn coordinator(uniswap: MockVenue) -> Arc<ScanCoordinator> {
        Arc::new(ScanCoordinator::new(
            Arc::new(MockVenue::aggregator("Kyber", 200.0, 199)),
            Arc::new(uniswap),
            test_basis(),
            RateNormalizer::new(18, 18),
            GasEstimator::new(Arc::new(CountingGasOracle::default()), DEFAULT_ASSUMED_GAS_UNITS),
            OpportunityReporter::new("Kyber", "Uniswap", "ETH", "DAI"),
            CoordinatorConfig::default(),
        ))
    }

    fn fast_config(max_reconnect_attempts: u32) -> SubscriberConfig {
        SubscriberConfig {
            max_reconnect_attempts,
            reconnect_delay: Duration::from_millis(1),
        }
    }

    async fn collect(mut rx: mpsc::UnboundedReceiver<CycleResult>) -> Vec<CycleResult> {
        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results.sort_by_key(|r| r.sequence);
        results
    }

    #[tokio::test]
    async fn test_reconnect_without_duplicate_cycles() {
        let mut first = blocks(&[100, 101, 102]);
        first.push(Err(StreamError::Transport("websocket reset".to_string())));
        // the new subscription redelivers 102 before moving on
        let second = blocks(&[102, 103, 104]);

        let source = ScriptedSource::new(vec![first, second]);
        let (tx, rx) = mpsc::unbounded_channel();
        let basis = test_basis();
        let subscriber = TriggerSubscriber::new(
            source,
            coordinator(MockVenue::pool("Uniswap", &basis, 100, 22_500)),
            fast_config(1),
        )
        .with_results(tx);
        let stats = subscriber.stats_handle();

        let err = subscriber.run().await.unwrap_err();
        assert!(matches!(err, StreamError::StreamDisconnected { .. }));

        let results = collect(rx).await;
        let sequences: Vec<u64> = results.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![100, 101, 102, 103, 104]);
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, CycleOutcome::Reported(_))));

        let stats = stats.read().await;
        assert_eq!(stats.triggers_received, 6);
        assert_eq!(stats.duplicates_skipped, 1);
        assert_eq!(stats.cycles_started, 5);
        assert_eq!(stats.reconnects, 2);
    }

    #[tokio::test]
    async fn test_failed_cycle_does_not_stop_triggers() {
        let source = ScriptedSource::new(vec![blocks(&[1, 2, 3])]);
        let (tx, rx) = mpsc::unbounded_channel();
        let basis = test_basis();
        let subscriber = TriggerSubscriber::new(
            source,
            coordinator(MockVenue::pool("Uniswap", &basis, 100, 22_500).failing_sells(1)),
            fast_config(1),
        )
        .with_results(tx);

        assert!(subscriber.run().await.is_err());

        let results = collect(rx).await;
        assert_eq!(results.len(), 3);
        let failures = results
            .iter()
            .filter(|r| matches!(r.outcome, CycleOutcome::Failed(_)))
            .count();
        assert_eq!(failures, 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let source = ScriptedSource::new(vec![]);
        let basis = test_basis();
        let subscriber = TriggerSubscriber::new(
            source,
            coordinator(MockVenue::pool("Uniswap", &basis, 100, 22_500)),
            fast_config(3),
        );
        let stats = subscriber.stats_handle();

        let err = subscriber.run().await.unwrap_err();
        assert_eq!(
            err,
            StreamError::StreamDisconnected {
                attempts: 3,
                last_error: "Trigger transport error: connection refused".to_string(),
            }
        );
        assert_eq!(stats.read().await.cycles_started, 0);
    }

    #[tokio::test]
    async fn test_empty_sessions_count_as_failed_attempts() {
        let source = ScriptedSource::new(vec![vec![], vec![]]);
        let basis = test_basis();
        let subscriber = TriggerSubscriber::new(
            source,
            coordinator(MockVenue::pool("Uniswap", &basis, 100, 22_500)),
            fast_config(2),
        );

        let err = subscriber.run().await.unwrap_err();
        assert_eq!(
            err,
            StreamError::StreamDisconnected {
                attempts: 2,
                last_error: "subscription closed".to_string(),
            }
        );
    }
}
