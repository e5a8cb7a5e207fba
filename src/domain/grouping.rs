//! Grouping partitioner: splits the alert stream into independent replay
//! groups keyed by (strategy, instrument, interval).

use crate::domain::alert::AlertRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupKey {
    pub strategy: String,
    pub instrument: String,
    pub interval_minutes: i64,
}

impl GroupKey {
    pub fn of(alert: &AlertRecord) -> Self {
        GroupKey {
            strategy: alert.strategy.clone(),
            instrument: alert.instrument.clone(),
            interval_minutes: alert.interval_minutes,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}m",
            self.strategy, self.instrument, self.interval_minutes
        )
    }
}

/// One group's alerts, in original insertion order.
#[derive(Debug, Clone)]
pub struct AlertGroup {
    pub key: GroupKey,
    pub alerts: Vec<AlertRecord>,
}

/// Partition alerts into groups, preserving insertion order inside each group
/// and first-seen order across groups.
///
/// Optional filters narrow which groups are enumerated; they never reorder
/// records. Keys come only from observed records, so no group is empty.
pub fn partition_alerts(
    alerts: &[AlertRecord],
    strategy_filter: Option<&str>,
    instrument_filter: Option<&str>,
) -> Vec<AlertGroup> {
    let mut groups: Vec<AlertGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for alert in alerts {
        if let Some(s) = strategy_filter {
            if alert.strategy != s {
                continue;
            }
        }
        if let Some(i) = instrument_filter {
            if alert.instrument != i {
                continue;
            }
        }

        let key = GroupKey::of(alert);
        match index.get(&key) {
            Some(&pos) => groups[pos].alerts.push(alert.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(AlertGroup {
                    key,
                    alerts: vec![alert.clone()],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::Action;
    use chrono::NaiveDate;

    fn make_alert(strategy: &str, instrument: &str, interval: i64, minute: u32) -> AlertRecord {
        let t = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap();
        AlertRecord {
            strategy: strategy.to_string(),
            instrument: instrument.to_string(),
            interval_minutes: interval,
            action: Action::Buy,
            chart_time: t,
            observed_time: t,
            chart_price: 100.0,
            execution_price: 100.0,
        }
    }

    #[test]
    fn partitions_by_full_key() {
        let alerts = vec![
            make_alert("a", "BTCUSDT", 60, 0),
            make_alert("a", "ETHUSDT", 60, 1),
            make_alert("a", "BTCUSDT", 240, 2),
            make_alert("b", "BTCUSDT", 60, 3),
            make_alert("a", "BTCUSDT", 60, 4),
        ];

        let groups = partition_alerts(&alerts, None, None);

        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].key.strategy, "a");
        assert_eq!(groups[0].key.instrument, "BTCUSDT");
        assert_eq!(groups[0].key.interval_minutes, 60);
        assert_eq!(groups[0].alerts.len(), 2);
        assert_eq!(groups[1].alerts.len(), 1);
        assert_eq!(groups[2].alerts.len(), 1);
        assert_eq!(groups[3].alerts.len(), 1);
    }

    #[test]
    fn no_record_shared_between_groups() {
        let alerts = vec![
            make_alert("a", "BTCUSDT", 60, 0),
            make_alert("b", "ETHUSDT", 60, 1),
            make_alert("a", "BTCUSDT", 60, 2),
        ];

        let groups = partition_alerts(&alerts, None, None);
        let total: usize = groups.iter().map(|g| g.alerts.len()).sum();
        assert_eq!(total, alerts.len());
    }

    #[test]
    fn preserves_order_within_group() {
        let alerts = vec![
            make_alert("a", "BTCUSDT", 60, 5),
            make_alert("a", "ETHUSDT", 60, 1),
            make_alert("a", "BTCUSDT", 60, 2),
            make_alert("a", "BTCUSDT", 60, 8),
        ];

        let groups = partition_alerts(&alerts, None, None);
        let btc = &groups[0];
        // insertion order, even though observed minutes go 5, 2, 8
        assert_eq!(btc.alerts[0].observed_time.format("%M").to_string(), "05");
        assert_eq!(btc.alerts[1].observed_time.format("%M").to_string(), "02");
        assert_eq!(btc.alerts[2].observed_time.format("%M").to_string(), "08");
    }

    #[test]
    fn strategy_filter_narrows_groups() {
        let alerts = vec![
            make_alert("a", "BTCUSDT", 60, 0),
            make_alert("b", "BTCUSDT", 60, 1),
        ];

        let groups = partition_alerts(&alerts, Some("a"), None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key.strategy, "a");
    }

    #[test]
    fn instrument_filter_narrows_groups() {
        let alerts = vec![
            make_alert("a", "BTCUSDT", 60, 0),
            make_alert("a", "ETHUSDT", 60, 1),
        ];

        let groups = partition_alerts(&alerts, None, Some("ETHUSDT"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key.instrument, "ETHUSDT");
    }

    #[test]
    fn both_filters_combine() {
        let alerts = vec![
            make_alert("a", "BTCUSDT", 60, 0),
            make_alert("a", "ETHUSDT", 60, 1),
            make_alert("b", "ETHUSDT", 60, 2),
        ];

        let groups = partition_alerts(&alerts, Some("a"), Some("ETHUSDT"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].alerts.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let groups = partition_alerts(&[], None, None);
        assert!(groups.is_empty());
    }

    #[test]
    fn group_key_display() {
        let key = GroupKey {
            strategy: "momentum".into(),
            instrument: "BTCUSDT".into(),
            interval_minutes: 240,
        };
        assert_eq!(key.to_string(), "momentum/BTCUSDT/240m");
    }
}
