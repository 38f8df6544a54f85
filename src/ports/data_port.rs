//! Bar series access port.

use crate::domain::bar::BarSeries;
use crate::domain::error::AnalysisError;

pub trait DataPort {
    /// Load the complete, chronologically ordered series called `name`.
    fn load_series(&self, name: &str) -> Result<BarSeries<f64>, AnalysisError>;

    /// Names of every series the source can load, sorted.
    fn list_series(&self) -> Result<Vec<String>, AnalysisError>;
}
