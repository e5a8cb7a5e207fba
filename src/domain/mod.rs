//! Core domain types and logic.

pub mod alert;
pub mod grouping;
pub mod simulator;
pub mod metrics;
pub mod replay;
pub mod config_validation;
pub mod error;
