//! Position simulator: the per-group replay state machine.
//!
//! Walks one group's alerts in insertion order, maintaining running balance
//! and position state, and emits one [`TradeStepResult`] per alert. A state
//! transition happens only when the incoming action differs from the last
//! one; a repeated signal in the same direction is an accounting no-op.

use crate::domain::alert::{Action, AlertRecord};
use crate::domain::error::AlertsimError;
use crate::domain::grouping::GroupKey;
use crate::domain::replay::ReplayConfig;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Running account state for one group's replay.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub current_balance: f64,
    pub balance_at_last_open: f64,
    /// Magnitude of open exposure; 0 means flat.
    pub coin_amount: f64,
    /// Notional cost basis of the currently open position.
    pub position_cost: f64,
    pub last_action: Option<Action>,
    pub trade_count: usize,
    pub trade_win_count: usize,
    pub trade_loss_count: usize,
    pub first_alert_time: Option<NaiveDateTime>,
    pub last_alert_time: Option<NaiveDateTime>,
}

impl SimulationState {
    pub fn new(starting_balance: f64) -> Self {
        SimulationState {
            current_balance: starting_balance,
            balance_at_last_open: 0.0,
            coin_amount: 0.0,
            position_cost: 0.0,
            last_action: None,
            trade_count: 0,
            trade_win_count: 0,
            trade_loss_count: 0,
            first_alert_time: None,
            last_alert_time: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.coin_amount == 0.0
    }
}

/// Snapshot of derived quantities for one processed alert.
///
/// Close-leg fields are zero when no position was closed this step; open-leg
/// fields are zero when nothing was opened. `coin_amount` and `balance`
/// reflect the state after the step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStepResult {
    pub step: usize,
    pub strategy: String,
    pub instrument: String,
    pub interval_minutes: i64,
    pub action: Action,
    pub execution_price: f64,
    pub leverage: f64,
    pub close_return: f64,
    pub profit: f64,
    pub profit_percent: f64,
    pub close_fees: f64,
    pub open_fees: f64,
    pub position_cost: f64,
    pub coin_amount: f64,
    pub balance: f64,
}

/// Full result of one group's replay: the per-step trace and final state.
#[derive(Debug, Clone)]
pub struct GroupReplay {
    pub key: GroupKey,
    pub steps: Vec<TradeStepResult>,
    pub state: SimulationState,
}

/// Replay one group's alerts in order.
///
/// Per alert, when the action differs from the last one:
/// 1. Close leg if a position is open: fees on the close notional, profit
///    against the position cost basis, balance rebuilt from the balance at
///    the last open, win/loss counters updated. Reversal sizing therefore
///    works off the post-close balance.
/// 2. Open leg on Buy/Sell: margin is a constant fraction of the current
///    balance, notional is margin times leverage, fees on the open notional.
/// 3. Flatten on any other action: exposure drops to zero, nothing opened.
///
/// The close leg requires `balance_at_last_open` to be non-zero; it is always
/// set by the prior open, so a zero here means the store's ordering invariant
/// was violated and the group fails with [`AlertsimError::ReplayFault`].
pub fn simulate_group(
    key: &GroupKey,
    alerts: &[AlertRecord],
    config: &ReplayConfig,
) -> Result<GroupReplay, AlertsimError> {
    let mut state = SimulationState::new(config.starting_balance);
    let mut steps = Vec::with_capacity(alerts.len());

    for (step, alert) in alerts.iter().enumerate() {
        if state.first_alert_time.is_none() {
            state.first_alert_time = Some(alert.observed_time);
        }

        let mut close_return = 0.0;
        let mut profit = 0.0;
        let mut profit_percent = 0.0;
        let mut close_fees = 0.0;
        let mut open_fees = 0.0;
        let mut opened_cost = 0.0;

        if state.last_action != Some(alert.action) {
            if state.coin_amount > 0.0 {
                if state.balance_at_last_open == 0.0 {
                    return Err(AlertsimError::ReplayFault {
                        strategy: key.strategy.clone(),
                        instrument: key.instrument.clone(),
                        interval_minutes: key.interval_minutes,
                        reason: format!(
                            "close leg at step {step} with no prior open; \
                             store ordering invariant violated"
                        ),
                    });
                }

                close_fees = state.coin_amount * alert.execution_price * config.fee_rate;
                if state.last_action == Some(Action::Sell) {
                    // closing a short: buy back, fees on top of the buyback
                    close_return = state.coin_amount * alert.execution_price + close_fees;
                    profit = state.position_cost - close_return;
                } else {
                    close_return = state.coin_amount * alert.execution_price - close_fees;
                    profit = close_return - state.position_cost;
                }

                state.current_balance = state.balance_at_last_open + profit;
                profit_percent =
                    (state.current_balance / state.balance_at_last_open - 1.0) * 100.0;
                state.trade_count += 1;
                if profit_percent >= 0.0 {
                    state.trade_win_count += 1;
                } else {
                    state.trade_loss_count += 1;
                }
            }

            if alert.action.opens_position() {
                let margin = state.current_balance * config.risk_fraction;
                open_fees = margin * config.leverage * config.fee_rate;
                state.position_cost = margin * config.leverage;
                opened_cost = state.position_cost;
                state.coin_amount = match alert.action {
                    Action::Buy => (state.position_cost - open_fees) / alert.execution_price,
                    _ => (state.position_cost + open_fees) / alert.execution_price,
                };
                state.balance_at_last_open = state.current_balance;
            } else {
                state.coin_amount = 0.0;
            }

            state.last_action = Some(alert.action);
        }

        steps.push(TradeStepResult {
            step,
            strategy: key.strategy.clone(),
            instrument: key.instrument.clone(),
            interval_minutes: key.interval_minutes,
            action: alert.action,
            execution_price: alert.execution_price,
            leverage: config.leverage,
            close_return,
            profit,
            profit_percent,
            close_fees,
            open_fees,
            position_cost: opened_cost,
            coin_amount: state.coin_amount,
            balance: state.current_balance,
        });

        state.last_alert_time = Some(alert.observed_time);
    }

    Ok(GroupReplay {
        key: key.clone(),
        steps,
        state,
    })
}
