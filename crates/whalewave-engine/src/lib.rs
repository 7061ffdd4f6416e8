//! Cycle orchestration for WhaleWave.
//!
//! [`Engine::evaluate_cycle`] is the synchronous entry point: validate the
//! snapshot, score it, gate the decision and update the account.
//! [`run_cycle`] adds the async collaborators and [`Scheduler`] ticks it.

mod config;
mod driver;
mod engine;
mod report;
mod scheduler;

pub use config::EngineConfig;
pub use driver::{
    run_cycle, run_cycle_with_timeout, CycleObserver, CycleOutcome, CycleStage, SkippedCycle,
    DEFAULT_ORACLE_TIMEOUT,
};
pub use engine::{CycleAnalysis, Engine};
pub use report::{CycleReport, GateSummary, SessionStats};
pub use scheduler::{Scheduler, SchedulerConfig};
