//! Periodic cycle scheduler.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use whalewave_core::traits::{DataProvider, StrategyOracle};

use crate::driver::{run_cycle_with_timeout, CycleObserver, CycleOutcome, DEFAULT_ORACLE_TIMEOUT};
use crate::engine::Engine;

/// Scheduler timing.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Tick period; `None` runs cycles back to back (replay)
    pub interval: Option<Duration>,
    pub oracle_timeout: Duration,
    /// Stop after this many driven cycles
    pub max_cycles: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_secs(60)),
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            max_cycles: None,
        }
    }
}

/// Runs one cycle per tick until shutdown or provider exhaustion.
///
/// Each cycle is awaited before the next tick is taken, and late ticks are
/// skipped rather than bunched up.
pub struct Scheduler<P, O> {
    engine: Engine,
    provider: P,
    oracle: O,
    observers: Vec<Box<dyn CycleObserver>>,
    config: SchedulerConfig,
}

impl<P, O> Scheduler<P, O>
where
    P: DataProvider,
    O: StrategyOracle,
{
    pub fn new(engine: Engine, provider: P, oracle: O, config: SchedulerConfig) -> Self {
        Self {
            engine,
            provider,
            oracle,
            observers: Vec::new(),
            config,
        }
    }

    pub fn with_observer(mut self, observer: impl CycleObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run until `shutdown` resolves, the provider is exhausted or
    /// `max_cycles` is reached. Returns the engine for final reporting.
    pub async fn run<F>(mut self, shutdown: F) -> Engine
    where
        F: Future<Output = ()>,
    {
        let mut ticker = self.config.interval.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        tokio::pin!(shutdown);

        info!(
            "Scheduler started for {} using {} and {}",
            self.engine.config().symbol,
            self.provider.name(),
            self.oracle.name()
        );

        let mut driven = 0u64;
        loop {
            match ticker.as_mut() {
                Some(ticker) => {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                        _ = ticker.tick() => {}
                    }
                }
                None => {
                    tokio::task::yield_now().await;
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                        _ = std::future::ready(()) => {}
                    }
                }
            }

            let outcome = run_cycle_with_timeout(
                &mut self.engine,
                &mut self.provider,
                &self.oracle,
                self.config.oracle_timeout,
            )
            .await;

            match outcome {
                CycleOutcome::Completed(report) => {
                    for observer in &mut self.observers {
                        observer.on_cycle(&report);
                    }
                }
                CycleOutcome::Skipped(skipped) => {
                    for observer in &mut self.observers {
                        observer.on_skip(&skipped);
                    }
                }
                CycleOutcome::Exhausted => {
                    info!("Data provider {} exhausted", self.provider.name());
                    break;
                }
            }

            driven += 1;
            if self.config.max_cycles.is_some_and(|max| driven >= max) {
                info!("Reached {} cycles", driven);
                break;
            }
        }

        for observer in &mut self.observers {
            observer.on_finish(self.engine.stats(), self.engine.account());
        }
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use whalewave_risk::AccountState;

    use crate::driver::tests::{engine, replay, HoldOracle};
    use crate::driver::SkippedCycle;
    use crate::report::{CycleReport, SessionStats};

    #[derive(Default)]
    struct Counts {
        cycles: u64,
        skips: u64,
        finished: bool,
    }

    struct Counter(Arc<Mutex<Counts>>);

    impl CycleObserver for Counter {
        fn on_cycle(&mut self, _report: &CycleReport) {
            self.0.lock().unwrap().cycles += 1;
        }

        fn on_skip(&mut self, _skipped: &SkippedCycle) {
            self.0.lock().unwrap().skips += 1;
        }

        fn on_finish(&mut self, _stats: &SessionStats, _account: &AccountState) {
            self.0.lock().unwrap().finished = true;
        }
    }

    fn back_to_back() -> SchedulerConfig {
        SchedulerConfig {
            interval: None,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_runs_until_exhausted() {
        let counts = Arc::new(Mutex::new(Counts::default()));
        let scheduler = Scheduler::new(engine(), replay(5), HoldOracle, back_to_back())
            .with_observer(Counter(counts.clone()));

        let engine = scheduler.run(std::future::pending()).await;

        let counts = counts.lock().unwrap();
        assert_eq!(counts.cycles, 5);
        assert_eq!(counts.skips, 0);
        assert!(counts.finished);
        assert_eq!(engine.stats().cycles, 5);
    }

    #[tokio::test]
    async fn test_max_cycles_with_interval() {
        let config = SchedulerConfig {
            interval: Some(Duration::from_millis(1)),
            max_cycles: Some(3),
            ..Default::default()
        };
        let engine = Scheduler::new(engine(), replay(10), HoldOracle, config)
            .run(std::future::pending())
            .await;
        assert_eq!(engine.stats().cycles, 3);
    }

    #[tokio::test]
    async fn test_shutdown_stops_before_next_cycle() {
        let counts = Arc::new(Mutex::new(Counts::default()));
        let engine = Scheduler::new(engine(), replay(10), HoldOracle, back_to_back())
            .with_observer(Counter(counts.clone()))
            .run(async {})
            .await;

        assert_eq!(engine.stats().cycles, 0);
        assert!(counts.lock().unwrap().finished);
    }
}
