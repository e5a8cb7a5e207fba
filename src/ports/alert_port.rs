//! Alert store port trait: the external signal-store collaborator.

use crate::domain::alert::AlertRecord;
use crate::domain::error::AlertsimError;
use crate::domain::grouping::GroupKey;

pub trait AlertPort {
    /// Fetch alerts in insertion order, optionally narrowed by strategy
    /// and/or instrument. The returned order is the replay order.
    fn fetch_alerts(
        &self,
        strategy: Option<&str>,
        instrument: Option<&str>,
    ) -> Result<Vec<AlertRecord>, AlertsimError>;

    /// Append one alert to the store, after the end of the sequence.
    fn append_alert(&self, alert: &AlertRecord) -> Result<(), AlertsimError>;

    /// Distinct group keys present in the store, with their alert counts.
    fn list_groups(&self) -> Result<Vec<(GroupKey, usize)>, AlertsimError>;
}
