//! CSV trade journal.

use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::warn;
use whalewave_engine::{CycleObserver, CycleReport, SessionStats};
use whalewave_risk::{AccountState, TradeEvent};

/// Appends every trade event to a CSV sink, one row per fill.
pub struct TradeJournal<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl TradeJournal<File> {
    /// Create (or truncate) a journal file.
    pub fn create(path: impl AsRef<Path>) -> csv::Result<Self> {
        Ok(Self::new(Writer::from_path(path)?))
    }
}

impl<W: Write> TradeJournal<W> {
    pub fn from_writer(sink: W) -> Self {
        Self::new(Writer::from_writer(sink))
    }

    fn new(writer: Writer<W>) -> Self {
        Self { writer, rows: 0 }
    }

    pub fn record(&mut self, event: &TradeEvent) -> csv::Result<()> {
        self.writer.serialize(event)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write + Send> CycleObserver for TradeJournal<W> {
    fn on_cycle(&mut self, report: &CycleReport) {
        for event in &report.events {
            if let Err(e) = self.record(event) {
                warn!("Failed to journal trade {}: {}", event.id, e);
            }
        }
    }

    fn on_finish(&mut self, _stats: &SessionStats, _account: &AccountState) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush trade journal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;
    use whalewave_core::types::Side;
    use whalewave_risk::TradeEventKind;

    fn event(kind: TradeEventKind, net: Option<rust_decimal::Decimal>) -> TradeEvent {
        TradeEvent {
            id: Default::default(),
            timestamp: DateTime::<Utc>::default(),
            kind,
            side: Side::Sell,
            strategy_label: "FADE".to_string(),
            exec_price: dec!(50000),
            quantity: dec!(0.03),
            fee: dec!(0.825),
            net_pnl: net,
            reason: "SL Hit".to_string(),
        }
    }

    #[test]
    fn test_journal_writes_header_and_rows() {
        let file = tempfile::NamedTempFile::new().unwrap();
        {
            let mut journal = TradeJournal::create(file.path()).unwrap();
            journal.record(&event(TradeEventKind::Open, None)).unwrap();
            journal
                .record(&event(TradeEventKind::Close, Some(dec!(-15.5))))
                .unwrap();
            assert_eq!(journal.rows(), 2);
            journal.flush().unwrap();
        }

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,timestamp,kind,side"));
        assert!(lines[1].contains("OPEN,SELL,FADE,50000,0.03,0.825,,SL Hit"));
        assert!(lines[2].contains("CLOSE"));
        assert!(lines[2].contains("-15.5"));
    }
}
