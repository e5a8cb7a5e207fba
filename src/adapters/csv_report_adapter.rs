//! CSV report writer adapter.

use crate::domain::error::AlertsimError;
use crate::domain::metrics::GroupSummary;
use crate::domain::simulator::TradeStepResult;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_summaries(
        &self,
        summaries: &[GroupSummary],
        output_path: &Path,
    ) -> Result<(), AlertsimError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| AlertsimError::Store {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;

        for summary in summaries {
            wtr.serialize(summary).map_err(|e| AlertsimError::Store {
                reason: format!("CSV write error: {}", e),
            })?;
        }

        wtr.flush().map_err(AlertsimError::Io)?;
        Ok(())
    }

    fn write_trace(
        &self,
        steps: &[TradeStepResult],
        output_path: &Path,
    ) -> Result<(), AlertsimError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| AlertsimError::Store {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;

        for step in steps {
            wtr.serialize(step).map_err(|e| AlertsimError::Store {
                reason: format!("CSV write error: {}", e),
            })?;
        }

        wtr.flush().map_err(AlertsimError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_summary(instrument: &str, ret: f64) -> GroupSummary {
        GroupSummary {
            strategy: "momentum".into(),
            instrument: instrument.into(),
            interval_minutes: 60,
            final_balance: 1000.0 * (1.0 + ret / 100.0),
            total_return_percent: ret,
            trade_count: 2,
            trade_win_count: 1,
            trade_loss_count: 1,
            win_rate: 0.5,
            elapsed_hours: 12,
        }
    }

    #[test]
    fn writes_summary_rows_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");

        let adapter = CsvReportAdapter::new();
        adapter
            .write_summaries(
                &[sample_summary("BTCUSDT", 10.0), sample_summary("ETHUSDT", -5.0)],
                &path,
            )
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("strategy,instrument,interval_minutes"));
        assert!(lines.next().unwrap().starts_with("momentum,BTCUSDT,60"));
        assert!(lines.next().unwrap().starts_with("momentum,ETHUSDT,60"));
    }

    #[test]
    fn writes_trace_rows() {
        use crate::domain::alert::Action;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.csv");

        let step = TradeStepResult {
            step: 0,
            strategy: "momentum".into(),
            instrument: "BTCUSDT".into(),
            interval_minutes: 60,
            action: Action::Buy,
            execution_price: 100.0,
            leverage: 2.0,
            close_return: 0.0,
            profit: 0.0,
            profit_percent: 0.0,
            close_fees: 0.0,
            open_fees: 1.0,
            position_cost: 2000.0,
            coin_amount: 19.99,
            balance: 1000.0,
        };

        let adapter = CsvReportAdapter::new();
        adapter.write_trace(&[step], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("buy"));
        assert!(content.contains("2000"));
    }

    #[test]
    fn empty_summaries_produce_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");

        let adapter = CsvReportAdapter::new();
        adapter.write_summaries(&[], &path).unwrap();

        assert!(path.exists());
    }
}
