#![allow(dead_code)]

use alertsim::domain::alert::{Action, AlertRecord};
use alertsim::domain::error::AlertsimError;
use alertsim::domain::grouping::GroupKey;
use alertsim::ports::alert_port::AlertPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;

/// In-memory alert store for tests. Alerts are served in insertion order;
/// appended alerts land at the end like rows in the CSV store.
pub struct MockAlertPort {
    alerts: RefCell<Vec<AlertRecord>>,
    fail_fetch: bool,
}

impl MockAlertPort {
    pub fn new() -> Self {
        MockAlertPort {
            alerts: RefCell::new(Vec::new()),
            fail_fetch: false,
        }
    }

    pub fn with_alerts(alerts: Vec<AlertRecord>) -> Self {
        MockAlertPort {
            alerts: RefCell::new(alerts),
            fail_fetch: false,
        }
    }

    pub fn failing() -> Self {
        MockAlertPort {
            alerts: RefCell::new(Vec::new()),
            fail_fetch: true,
        }
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.borrow().len()
    }
}

impl AlertPort for MockAlertPort {
    fn fetch_alerts(
        &self,
        strategy: Option<&str>,
        instrument: Option<&str>,
    ) -> Result<Vec<AlertRecord>, AlertsimError> {
        if self.fail_fetch {
            return Err(AlertsimError::Store {
                reason: "mock store failure".to_string(),
            });
        }
        Ok(self
            .alerts
            .borrow()
            .iter()
            .filter(|a| strategy.is_none_or(|s| a.strategy == s))
            .filter(|a| instrument.is_none_or(|i| a.instrument == i))
            .cloned()
            .collect())
    }

    fn append_alert(&self, alert: &AlertRecord) -> Result<(), AlertsimError> {
        self.alerts.borrow_mut().push(alert.clone());
        Ok(())
    }

    fn list_groups(&self) -> Result<Vec<(GroupKey, usize)>, AlertsimError> {
        let mut groups: Vec<(GroupKey, usize)> = Vec::new();
        for alert in self.alerts.borrow().iter() {
            let key = GroupKey::of(alert);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) => *count += 1,
                None => groups.push((key, 1)),
            }
        }
        Ok(groups)
    }
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn make_alert(
    strategy: &str,
    instrument: &str,
    interval_minutes: i64,
    action: Action,
    price: f64,
    minutes_offset: i64,
) -> AlertRecord {
    let t = base_time() + chrono::Duration::minutes(minutes_offset);
    AlertRecord {
        strategy: strategy.to_string(),
        instrument: instrument.to_string(),
        interval_minutes,
        action,
        chart_time: t,
        observed_time: t,
        chart_price: price,
        execution_price: price,
    }
}

/// Shorthand for the common single-group case.
pub fn make_btc_alert(action: Action, price: f64, minutes_offset: i64) -> AlertRecord {
    make_alert("macd-cross", "BTCUSDT", 60, action, price, minutes_offset)
}
