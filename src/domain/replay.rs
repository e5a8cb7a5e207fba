//! Replay orchestration: partition, simulate each group, aggregate.

use crate::domain::alert::AlertRecord;
use crate::domain::error::AlertsimError;
use crate::domain::grouping::{partition_alerts, GroupKey};
use crate::domain::metrics::{sort_summaries, GroupSummary};
use crate::domain::simulator::{simulate_group, TradeStepResult};
use rayon::prelude::*;

/// Caller-supplied simulation parameters.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub leverage: f64,
    pub risk_fraction: f64,
    pub starting_balance: f64,
    pub fee_rate: f64,
    pub strategy_filter: Option<String>,
    pub instrument_filter: Option<String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            leverage: 1.0,
            risk_fraction: 1.0,
            starting_balance: 1000.0,
            fee_rate: 0.0,
            strategy_filter: None,
            instrument_filter: None,
        }
    }
}

impl ReplayConfig {
    /// Rejects out-of-range parameters before any group is replayed.
    pub fn validate(&self) -> Result<(), AlertsimError> {
        if self.leverage < 1.0 {
            return Err(AlertsimError::InvalidParameter {
                name: "leverage".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.risk_fraction <= 0.0 || self.risk_fraction > 1.0 {
            return Err(AlertsimError::InvalidParameter {
                name: "risk_fraction".into(),
                reason: "must be in (0, 1]".into(),
            });
        }
        if self.starting_balance <= 0.0 {
            return Err(AlertsimError::InvalidParameter {
                name: "starting_balance".into(),
                reason: "must be positive".into(),
            });
        }
        if self.fee_rate < 0.0 || self.fee_rate >= 1.0 {
            return Err(AlertsimError::InvalidParameter {
                name: "fee_rate".into(),
                reason: "must be in [0, 1)".into(),
            });
        }
        Ok(())
    }
}

/// A group whose replay failed its internal-consistency check.
#[derive(Debug, Clone)]
pub struct GroupFault {
    pub key: GroupKey,
    pub reason: String,
}

/// The full replay output: all trace steps in group order, summaries sorted
/// by instrument then return descending, and any per-group faults.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub steps: Vec<TradeStepResult>,
    pub summaries: Vec<GroupSummary>,
    pub faults: Vec<GroupFault>,
}

/// Replay all alerts: pure function of its inputs.
///
/// Groups are independent and replayed concurrently; results are gathered in
/// partition order so the output is deterministic regardless of scheduling.
/// A fault in one group lands in `faults` without aborting its siblings.
pub fn replay(alerts: &[AlertRecord], config: &ReplayConfig) -> Result<ReplayReport, AlertsimError> {
    config.validate()?;

    let groups = partition_alerts(
        alerts,
        config.strategy_filter.as_deref(),
        config.instrument_filter.as_deref(),
    );

    let results: Vec<_> = groups
        .par_iter()
        .map(|group| simulate_group(&group.key, &group.alerts, config))
        .collect();

    let mut steps = Vec::with_capacity(alerts.len());
    let mut summaries = Vec::with_capacity(groups.len());
    let mut faults = Vec::new();

    for (group, result) in groups.iter().zip(results) {
        match result {
            Ok(group_replay) => {
                summaries.push(GroupSummary::from_replay(&group_replay, config.starting_balance));
                steps.extend(group_replay.steps);
            }
            Err(e) => faults.push(GroupFault {
                key: group.key.clone(),
                reason: e.to_string(),
            }),
        }
    }

    sort_summaries(&mut summaries);

    Ok(ReplayReport {
        steps,
        summaries,
        faults,
    })
}
