//! Configuration validation.
//!
//! Validates all config fields before a replay runs.

use crate::domain::error::AlertsimError;
use crate::ports::config_port::ConfigPort;

pub fn validate_replay_config(config: &dyn ConfigPort) -> Result<(), AlertsimError> {
    validate_leverage(config)?;
    validate_risk_fraction(config)?;
    validate_starting_balance(config)?;
    validate_fee_rate(config)?;
    Ok(())
}

pub fn validate_store_config(config: &dyn ConfigPort) -> Result<(), AlertsimError> {
    if config.get_string("store", "alerts_path").is_none() {
        return Err(AlertsimError::ConfigMissing {
            section: "store".to_string(),
            key: "alerts_path".to_string(),
        });
    }
    Ok(())
}

fn validate_leverage(config: &dyn ConfigPort) -> Result<(), AlertsimError> {
    let value = config.get_double("replay", "leverage", 1.0);
    if value < 1.0 {
        return Err(AlertsimError::ConfigInvalid {
            section: "replay".to_string(),
            key: "leverage".to_string(),
            reason: "leverage must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_fraction(config: &dyn ConfigPort) -> Result<(), AlertsimError> {
    let value = config.get_double("replay", "risk_fraction", 1.0);
    if value <= 0.0 || value > 1.0 {
        return Err(AlertsimError::ConfigInvalid {
            section: "replay".to_string(),
            key: "risk_fraction".to_string(),
            reason: "risk_fraction must be in (0, 1]".to_string(),
        });
    }
    Ok(())
}

fn validate_starting_balance(config: &dyn ConfigPort) -> Result<(), AlertsimError> {
    let value = config.get_double("replay", "starting_balance", 1000.0);
    if value <= 0.0 {
        return Err(AlertsimError::ConfigInvalid {
            section: "replay".to_string(),
            key: "starting_balance".to_string(),
            reason: "starting_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_fee_rate(config: &dyn ConfigPort) -> Result<(), AlertsimError> {
    let value = config.get_double("replay", "fee_rate", 0.0);
    if value < 0.0 || value >= 1.0 {
        return Err(AlertsimError::ConfigInvalid {
            section: "replay".to_string(),
            key: "fee_rate".to_string(),
            reason: "fee_rate must be in [0, 1)".to_string(),
        });
    }
    Ok(())
}
