//! Quote source port trait.
//!
//! Execution-price resolution is exchange-specific I/O and lives behind this
//! seam; exchange client variants implement `QuotePort` and the rest of the
//! system only sees a resolved bid/ask pair.

use crate::domain::alert::Action;
use crate::domain::error::AlertsimError;

/// Best bid/ask for an instrument at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

pub trait QuotePort {
    fn latest_quote(&self, instrument: &str) -> Result<Quote, AlertsimError>;
}

/// A buy fills at the ask; anything else fills at the bid.
pub fn execution_price(action: Action, quote: &Quote) -> f64 {
    match action {
        Action::Buy => quote.ask,
        _ => quote.bid,
    }
}
