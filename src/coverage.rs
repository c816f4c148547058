//!
//! # Area and coverage solver
//!
//! Derives the working radii of the vessel from its thicknesses, the total mounting surface
//! (barrel and both end-caps) and the PMT count and pitch that achieve a photocathode coverage target.
//!
//! # Examples
//!
//! ```
//! use pmt_coverage::coverage::{CoverageSolution, Vessel};
//! let geometry = Vessel::default().geometry();
//! let solution = CoverageSolution::solve(&[0., 0.254], 0.4, &geometry).unwrap();
//! assert_eq!(solution.required_pmts, 3562);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Vessel dimensions
///
/// Default properties:
///  - steel thickness  : 6mm
///  - shield thickness : 20cm
///  - detector size    : 20m
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    /// Thickness of the PMT support structure
    pub steel_thickness: f64,
    /// Thickness of the shield between the vessel wall and the PMTs
    pub shield_thickness: f64,
    /// Diameter (and height) of the vessel
    pub detector_size: f64,
}
impl Default for Vessel {
    fn default() -> Self {
        Self {
            steel_thickness: 0.006,
            shield_thickness: 0.2,
            detector_size: 20.,
        }
    }
}
impl Vessel {
    /// Returns the radii and half-height derived from the vessel dimensions
    pub fn geometry(&self) -> VesselGeometry {
        let half_size = self.detector_size / 2.0;
        VesselGeometry {
            pmt_radius: half_size - self.shield_thickness - 4.0 * self.steel_thickness,
            cable_radius: half_size - self.shield_thickness + 4.0 * self.steel_thickness,
            topbot_offset: half_size - self.shield_thickness,
        }
    }
}

/// Working geometry of the vessel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselGeometry {
    /// Radius of the cylinder the barrel PMTs are mounted on
    pub pmt_radius: f64,
    /// Radius of the ring of support cables, just outside the PMT ring
    pub cable_radius: f64,
    /// Distance from the equator to each end-cap plane
    pub topbot_offset: f64,
}
impl VesselGeometry {
    /// Area of one end-cap disk
    pub fn endcap_area(&self) -> f64 {
        PI * self.pmt_radius * self.pmt_radius
    }
    /// Area of the barrel
    pub fn barrel_area(&self) -> f64 {
        2.0 * self.topbot_offset * 2.0 * PI * self.pmt_radius
    }
    /// Total mounting surface: barrel and both end-caps
    pub fn surface_area(&self) -> f64 {
        2.0 * self.endcap_area() + self.barrel_area()
    }
}

/// Returns the photocathode radius i.e. the largest of the photocathode edge radius samples
///
/// Returns `None` if there is no sample
pub fn photocathode_radius(rho_edge: &[f64]) -> Option<f64> {
    rho_edge.iter().cloned().reduce(f64::max)
}

/// PMT count and pitch for a given coverage target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSolution {
    /// Desired photocathode coverage
    pub coverage: f64,
    pub photocathode_radius: f64,
    pub photocathode_area: f64,
    /// Total mounting surface
    pub surface_area: f64,
    /// Number of PMTs needed to reach the coverage target
    pub required_pmts: usize,
    /// Distance between adjacent PMT centers, common to the barrel and the end-caps
    pub pmt_space: f64,
}
impl CoverageSolution {
    /// Solves for the PMT count and pitch
    ///
    /// Returns `None` if `rho_edge` is empty.
    /// Degenerate inputs (zero coverage, zero photocathode area) are not checked and
    /// propagate as non-finite or zero values.
    pub fn solve(rho_edge: &[f64], coverage: f64, geometry: &VesselGeometry) -> Option<Self> {
        let photocathode_radius = photocathode_radius(rho_edge)?;
        let photocathode_area = PI * photocathode_radius * photocathode_radius;
        let surface_area = geometry.surface_area();
        let required_pmts = (coverage * surface_area / photocathode_area).ceil();
        let pmt_space = (surface_area / required_pmts).sqrt();
        Some(Self {
            coverage,
            photocathode_radius,
            photocathode_area,
            surface_area,
            required_pmts: required_pmts as usize,
            pmt_space,
        })
    }
    /// Coverage achieved by a given number of PMTs
    pub fn achieved_coverage(&self, n_pmt: usize) -> f64 {
        self.photocathode_area * n_pmt as f64 / self.surface_area
    }
}
