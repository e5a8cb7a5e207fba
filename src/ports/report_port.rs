//! Report output port trait.

use crate::domain::error::AlertsimError;
use crate::domain::metrics::GroupSummary;
use crate::domain::simulator::TradeStepResult;
use std::path::Path;

/// Port for writing replay results as structured files.
pub trait ReportPort {
    fn write_summaries(
        &self,
        summaries: &[GroupSummary],
        output_path: &Path,
    ) -> Result<(), AlertsimError>;

    fn write_trace(
        &self,
        steps: &[TradeStepResult],
        output_path: &Path,
    ) -> Result<(), AlertsimError>;
}
