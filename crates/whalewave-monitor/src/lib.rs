//! Observability for WhaleWave: logging setup, cycle observers and the
//! CSV trade journal.

mod journal;
mod logging;
mod observer;

pub use journal::TradeJournal;
pub use logging::setup_logging;
pub use observer::TracingObserver;
