//! CSV file alert store adapter.
//!
//! One row per alert, appended as received. Row order in the file is the
//! insertion order the simulator depends on; this adapter never re-sorts.
//! Malformed rows are rejected here so the domain core never has to
//! re-validate records.

use crate::domain::alert::{Action, AlertRecord};
use crate::domain::error::AlertsimError;
use crate::domain::grouping::GroupKey;
use crate::ports::alert_port::AlertPort;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

const HEADER: &str = "strategy,instrument,interval,action,chart_time,time,chart_price,price";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAlertAdapter {
    path: PathBuf,
}

impl CsvAlertAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlertsimError> {
        let path = config
            .get_string("store", "alerts_path")
            .ok_or_else(|| AlertsimError::ConfigMissing {
                section: "store".into(),
                key: "alerts_path".into(),
            })?;
        Ok(Self::new(PathBuf::from(path)))
    }

    fn parse_time(value: &str, record: usize, field: &str) -> Result<NaiveDateTime, AlertsimError> {
        NaiveDateTime::parse_from_str(value, TIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|e| AlertsimError::MalformedAlert {
                record,
                reason: format!("invalid {field} timestamp {value:?}: {e}"),
            })
    }

    fn field<'a>(
        rec: &'a csv::StringRecord,
        idx: usize,
        record: usize,
        name: &str,
    ) -> Result<&'a str, AlertsimError> {
        rec.get(idx).ok_or_else(|| AlertsimError::MalformedAlert {
            record,
            reason: format!("missing {name} column"),
        })
    }
}

impl AlertPort for CsvAlertAdapter {
    fn fetch_alerts(
        &self,
        strategy: Option<&str>,
        instrument: Option<&str>,
    ) -> Result<Vec<AlertRecord>, AlertsimError> {
        let content = fs::read_to_string(&self.path).map_err(|e| AlertsimError::Store {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut alerts = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let record_no = i + 1;
            let rec = result.map_err(|e| AlertsimError::Store {
                reason: format!("CSV parse error: {}", e),
            })?;

            let alert_strategy = Self::field(&rec, 0, record_no, "strategy")?;
            let alert_instrument = Self::field(&rec, 1, record_no, "instrument")?;

            if let Some(s) = strategy {
                if alert_strategy != s {
                    continue;
                }
            }
            if let Some(inst) = instrument {
                if alert_instrument != inst {
                    continue;
                }
            }

            let interval_minutes: i64 = Self::field(&rec, 2, record_no, "interval")?
                .parse()
                .map_err(|e| AlertsimError::MalformedAlert {
                    record: record_no,
                    reason: format!("invalid interval value: {e}"),
                })?;

            let action = Action::parse(Self::field(&rec, 3, record_no, "action")?);
            let chart_time =
                Self::parse_time(Self::field(&rec, 4, record_no, "chart_time")?, record_no, "chart_time")?;
            let observed_time =
                Self::parse_time(Self::field(&rec, 5, record_no, "time")?, record_no, "time")?;

            let chart_price: f64 = Self::field(&rec, 6, record_no, "chart_price")?
                .parse()
                .map_err(|e| AlertsimError::MalformedAlert {
                    record: record_no,
                    reason: format!("invalid chart_price value: {e}"),
                })?;

            let execution_price: f64 = Self::field(&rec, 7, record_no, "price")?
                .parse()
                .map_err(|e| AlertsimError::MalformedAlert {
                    record: record_no,
                    reason: format!("invalid price value: {e}"),
                })?;

            alerts.push(AlertRecord {
                strategy: alert_strategy.to_string(),
                instrument: alert_instrument.to_string(),
                interval_minutes,
                action,
                chart_time,
                observed_time,
                chart_price,
                execution_price,
            });
        }

        Ok(alerts)
    }

    fn append_alert(&self, alert: &AlertRecord) -> Result<(), AlertsimError> {
        let new_file = !self.path.exists();

        let mut buf = Vec::new();
        {
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut buf);
            wtr.write_record([
                alert.strategy.as_str(),
                alert.instrument.as_str(),
                &alert.interval_minutes.to_string(),
                &alert.action.to_string(),
                &alert.chart_time.format(TIME_FORMAT).to_string(),
                &alert.observed_time.format(TIME_FORMAT).to_string(),
                &alert.chart_price.to_string(),
                &alert.execution_price.to_string(),
            ])
            .map_err(|e| AlertsimError::Store {
                reason: format!("CSV write error: {}", e),
            })?;
            wtr.flush().map_err(|e| AlertsimError::Store {
                reason: format!("CSV flush error: {}", e),
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AlertsimError::Store {
                reason: format!("failed to open {}: {}", self.path.display(), e),
            })?;

        if new_file {
            writeln!(file, "{HEADER}").map_err(AlertsimError::Io)?;
        }
        file.write_all(&buf).map_err(AlertsimError::Io)?;

        Ok(())
    }

    fn list_groups(&self) -> Result<Vec<(GroupKey, usize)>, AlertsimError> {
        let alerts = self.fetch_alerts(None, None)?;

        let mut order: Vec<GroupKey> = Vec::new();
        let mut counts: HashMap<GroupKey, usize> = HashMap::new();

        for alert in &alerts {
            let key = GroupKey::of(alert);
            if !counts.contains_key(&key) {
                order.push(key.clone());
            }
            *counts.entry(key).or_insert(0) += 1;
        }

        Ok(order
            .into_iter()
            .map(|key| {
                let count = counts[&key];
                (key, count)
            })
            .collect())
    }
}
