//! Port traits at the I/O seams.

pub mod alert_port;
pub mod config_port;
pub mod quote_port;
pub mod report_port;
