use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Desired versus achieved layout properties
///
/// The number of barrel columns and rows are rounded independently, so the achieved
/// coverage differs slightly from the desired one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub desired_coverage: f64,
    pub surface_area: f64,
    pub photocathode_radius: f64,
    pub photocathode_area: f64,
    pub required_pmts: usize,
    pub pmt_space: f64,
    pub actual_coverage: f64,
    pub generated_pmts: usize,
    pub cols: usize,
    pub rows: usize,
}
impl CoverageReport {
    /// Relative deviation of the achieved coverage from the desired coverage
    pub fn coverage_deviation(&self) -> f64 {
        (self.actual_coverage - self.desired_coverage).abs() / self.desired_coverage
    }
}
impl Display for CoverageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Generating new PMT positions for:")?;
        writeln!(f, "\tdesired photocathode coverage {}", self.desired_coverage)?;
        writeln!(f, "\ttotal area {}", self.surface_area)?;
        writeln!(f, "\tphotocathode radius {}", self.photocathode_radius)?;
        writeln!(f, "\tphotocathode area {}", self.photocathode_area)?;
        writeln!(f, "\tdesired PMTs {}", self.required_pmts)?;
        writeln!(f, "\tPMT spacing {}", self.pmt_space)?;
        writeln!(f, "Actual calculated values:")?;
        writeln!(f, "\tactual photocathode coverage {}", self.actual_coverage)?;
        writeln!(f, "\tgenerated PMTs {}", self.generated_pmts)?;
        writeln!(f, "\tcols {}", self.cols)?;
        write!(f, "\trows {}", self.rows)
    }
}
