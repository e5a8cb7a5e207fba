//! Alert record and signal action representation.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Directional trading signal carried by an alert.
///
/// Anything a webhook sends that is not buy/sell ("close", "exit", arbitrary
/// text) is a flattening signal and maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Other,
}

impl Action {
    pub fn parse(input: &str) -> Action {
        match input.trim().to_lowercase().as_str() {
            "buy" => Action::Buy,
            "sell" => Action::Sell,
            _ => Action::Other,
        }
    }

    /// Buy and Sell open a new position; Other only flattens.
    pub fn opens_position(&self) -> bool {
        matches!(self, Action::Buy | Action::Sell)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
            Action::Other => write!(f, "other"),
        }
    }
}

/// One stored trading-signal alert.
///
/// `execution_price` is the already-resolved fill price (bid or ask captured
/// at ingestion time); the simulator never re-derives it. `chart_time` and
/// `chart_price` are informational only.
#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub strategy: String,
    pub instrument: String,
    pub interval_minutes: i64,
    pub action: Action,
    pub chart_time: NaiveDateTime,
    pub observed_time: NaiveDateTime,
    pub chart_price: f64,
    pub execution_price: f64,
}
