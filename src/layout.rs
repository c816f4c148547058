//!
//! # Cylindrical PMT layout
//!
//! Provides the structure [CylinderLayout] with the PMT positions and directions, and the
//! support cable anchors of a cylindrical detector.
//! `CylinderLayout` is created with the [CylinderLayoutBuilder] builder.
//!
//! The PMTs are stored in a single flat array: the barrel PMTs first, in column major order,
//! followed by the end-cap PMTs with the top and bottom PMTs of each end-cap lattice point
//! next to each other.
//!
//! # Examples
//!
//! ```
//! use pmt_coverage::{Builder, CylinderLayout, FromBuilder};
//! let layout = CylinderLayout::builder()
//!     .photocathode_coverage(0.2)
//!     .build()
//!     .unwrap();
//! assert_eq!(layout.n_pmt(), layout.cols() * layout.rows() + 2 * layout.endcap.len());
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    coverage::{CoverageSolution, Vessel, VesselGeometry},
    FromBuilder,
};

mod builder;
mod grid;
mod report;
pub use builder::{CylinderLayoutBuilder, LayoutBuilderError};
pub use grid::{cable_anchors, BarrelGrid, EndcapLattice};
pub use report::CoverageReport;

/// Type tag of the inner detector PMTs
pub const INNER_PMT_TYPE: i64 = 1;

/// PMT position, direction and type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmtRecord {
    pub position: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub pmt_type: i64,
}

/// Support cable anchor position and direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableAnchor {
    pub position: Vector3<f64>,
    pub direction: Vector3<f64>,
}

/// PMT layout of a cylindrical detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderLayout {
    pub vessel: Vessel,
    pub geometry: VesselGeometry,
    pub solution: CoverageSolution,
    pub barrel: BarrelGrid,
    pub endcap: EndcapLattice,
    pmts: Vec<PmtRecord>,
    cables: Vec<CableAnchor>,
}
impl FromBuilder for CylinderLayout {
    type ComponentBuilder = CylinderLayoutBuilder;
}
impl CylinderLayout {
    /// Total number of PMTs
    pub fn n_pmt(&self) -> usize {
        self.pmts.len()
    }
    /// Number of barrel columns
    pub fn cols(&self) -> usize {
        self.barrel.cols
    }
    /// Number of barrel rows
    pub fn rows(&self) -> usize {
        self.barrel.rows
    }
    /// All the PMTs
    pub fn pmts(&self) -> &[PmtRecord] {
        &self.pmts
    }
    /// The barrel PMTs
    pub fn barrel_pmts(&self) -> &[PmtRecord] {
        &self.pmts[..self.barrel.len()]
    }
    /// The end-cap PMTs, alternating top and bottom
    pub fn endcap_pmts(&self) -> &[PmtRecord] {
        &self.pmts[self.barrel.len()..]
    }
    /// The support cable anchors, one per barrel column
    pub fn cables(&self) -> &[CableAnchor] {
        &self.cables
    }
    /// Photocathode coverage achieved by the layout
    pub fn achieved_coverage(&self) -> f64 {
        self.solution.achieved_coverage(self.n_pmt())
    }
    /// Desired and achieved layout properties
    pub fn report(&self) -> CoverageReport {
        CoverageReport {
            desired_coverage: self.solution.coverage,
            surface_area: self.solution.surface_area,
            photocathode_radius: self.solution.photocathode_radius,
            photocathode_area: self.solution.photocathode_area,
            required_pmts: self.solution.required_pmts,
            pmt_space: self.solution.pmt_space,
            actual_coverage: self.achieved_coverage(),
            generated_pmts: self.n_pmt(),
            cols: self.cols(),
            rows: self.rows(),
        }
    }
}
