//! Domain error types.

/// Top-level error type for alertsim.
#[derive(Debug, thiserror::Error)]
pub enum AlertsimError {
    #[error("alert store error: {reason}")]
    Store { reason: String },

    #[error("malformed alert at record {record}: {reason}")]
    MalformedAlert { record: usize, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid replay parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("no quote available for {instrument}: {reason}")]
    Quote { instrument: String, reason: String },

    #[error("replay fault in {strategy}/{instrument}/{interval_minutes}m: {reason}")]
    ReplayFault {
        strategy: String,
        instrument: String,
        interval_minutes: i64,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&AlertsimError> for std::process::ExitCode {
    fn from(err: &AlertsimError) -> Self {
        let code: u8 = match err {
            AlertsimError::Io(_) => 1,
            AlertsimError::ConfigParse { .. }
            | AlertsimError::ConfigMissing { .. }
            | AlertsimError::ConfigInvalid { .. }
            | AlertsimError::InvalidParameter { .. } => 2,
            AlertsimError::Store { .. } | AlertsimError::MalformedAlert { .. } => 3,
            AlertsimError::ReplayFault { .. } => 4,
            AlertsimError::Quote { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
