//! CSV quote table adapter.
//!
//! A flat instrument,bid,ask table standing in for a live exchange client.
//! The last row for an instrument wins, so a refreshed quote can simply be
//! appended.

use crate::domain::error::AlertsimError;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::{Quote, QuotePort};
use std::fs;
use std::path::PathBuf;

pub struct CsvQuoteAdapter {
    path: PathBuf,
}

impl CsvQuoteAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlertsimError> {
        let path = config
            .get_string("store", "quotes_path")
            .ok_or_else(|| AlertsimError::ConfigMissing {
                section: "store".into(),
                key: "quotes_path".into(),
            })?;
        Ok(Self::new(PathBuf::from(path)))
    }
}

impl QuotePort for CsvQuoteAdapter {
    fn latest_quote(&self, instrument: &str) -> Result<Quote, AlertsimError> {
        let content = fs::read_to_string(&self.path).map_err(|e| AlertsimError::Quote {
            instrument: instrument.to_string(),
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut latest = None;

        for result in rdr.records() {
            let rec = result.map_err(|e| AlertsimError::Quote {
                instrument: instrument.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            if rec.get(0) != Some(instrument) {
                continue;
            }

            let bid: f64 = rec
                .get(1)
                .ok_or_else(|| AlertsimError::Quote {
                    instrument: instrument.to_string(),
                    reason: "missing bid column".into(),
                })?
                .parse()
                .map_err(|e| AlertsimError::Quote {
                    instrument: instrument.to_string(),
                    reason: format!("invalid bid value: {}", e),
                })?;

            let ask: f64 = rec
                .get(2)
                .ok_or_else(|| AlertsimError::Quote {
                    instrument: instrument.to_string(),
                    reason: "missing ask column".into(),
                })?
                .parse()
                .map_err(|e| AlertsimError::Quote {
                    instrument: instrument.to_string(),
                    reason: format!("invalid ask value: {}", e),
                })?;

            latest = Some(Quote { bid, ask });
        }

        latest.ok_or_else(|| AlertsimError::Quote {
            instrument: instrument.to_string(),
            reason: "instrument not present in quote table".into(),
        })
    }
}
