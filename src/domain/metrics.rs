//! Per-group performance summaries.

use crate::domain::simulator::GroupReplay;
use serde::Serialize;
use std::cmp::Ordering;

/// Final statistics for one replay group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub strategy: String,
    pub instrument: String,
    pub interval_minutes: i64,
    pub final_balance: f64,
    pub total_return_percent: f64,
    pub trade_count: usize,
    pub trade_win_count: usize,
    pub trade_loss_count: usize,
    pub win_rate: f64,
    pub elapsed_hours: i64,
}

impl GroupSummary {
    /// Fold a finished replay into its summary.
    ///
    /// Only realized trades count; an unclosed final position contributes
    /// nothing here. A group with no trades reports the starting balance
    /// carried through unchanged.
    pub fn from_replay(replay: &GroupReplay, starting_balance: f64) -> Self {
        let state = &replay.state;

        let total_return_percent = (state.current_balance / starting_balance - 1.0) * 100.0;

        let win_rate = if state.trade_count > 0 {
            state.trade_win_count as f64 / state.trade_count as f64
        } else {
            0.0
        };

        let elapsed_hours = match (state.first_alert_time, state.last_alert_time) {
            (Some(first), Some(last)) => {
                let hours = (last - first).num_seconds() as f64 / 3600.0;
                hours.round() as i64
            }
            _ => 0,
        };

        GroupSummary {
            strategy: replay.key.strategy.clone(),
            instrument: replay.key.instrument.clone(),
            interval_minutes: replay.key.interval_minutes,
            final_balance: state.current_balance,
            total_return_percent,
            trade_count: state.trade_count,
            trade_win_count: state.trade_win_count,
            trade_loss_count: state.trade_loss_count,
            win_rate,
            elapsed_hours,
        }
    }
}

/// Sort summaries by instrument, then total return descending.
///
/// This ordering is part of the output contract: it puts the best
/// strategy/interval combination for each instrument first.
pub fn sort_summaries(summaries: &mut [GroupSummary]) {
    summaries.sort_by(|a, b| {
        a.instrument.cmp(&b.instrument).then_with(|| {
            b.total_return_percent
                .partial_cmp(&a.total_return_percent)
                .unwrap_or(Ordering::Equal)
        })
    });
}
