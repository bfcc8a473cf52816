//! Output of the ranked selection.

use crate::domain::error::TraderError;
use crate::domain::observation::Observation;

/// Port for publishing the most-declined symbols before orders go out.
pub trait ReportPort {
    fn write_selection(&self, selected: &[Observation]) -> Result<(), TraderError>;
}
