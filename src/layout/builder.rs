use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{cable_anchors, BarrelGrid, CylinderLayout, EndcapLattice};
use crate::{
    coverage::{CoverageSolution, Vessel},
    store::{ConfigStore, NestedLink, StoreError},
    Builder, CoverageError, Result,
};

/// `CylinderLayout` builder
///
/// Default properties:
///  - photocathode coverage        : 40%
///  - photocathode edge radius     : [0, 25.4cm]
///  - vessel:
///    - steel thickness            : 6mm
///    - shield thickness           : 20cm
///    - detector size              : 20m
///
/// # Examples
///
/// ```
/// use pmt_coverage::{Builder, CylinderLayout, FromBuilder};
/// let layout = CylinderLayout::builder().build().unwrap();
/// ```
///
/// ```
/// use pmt_coverage::{Builder, CylinderLayout, FromBuilder};
/// let layout = CylinderLayout::builder()
///     .photocathode_coverage(0.2)
///     .photocathode_radius(0.127)
///     .detector_size(16.)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderLayoutBuilder {
    pub photocathode_coverage: f64,
    pub rho_edge: Vec<f64>,
    pub vessel: Vessel,
}
impl Default for CylinderLayoutBuilder {
    fn default() -> Self {
        Self {
            photocathode_coverage: 0.4,
            rho_edge: vec![0.0, 0.254],
            vessel: Vessel::default(),
        }
    }
}

const HEADER: &str = "# ::pmt_coverage::CylinderLayoutBuilder";

#[derive(Debug, thiserror::Error)]
pub enum LayoutBuilderError {
    #[error("failed to read the layout parameters from {1}")]
    Read(#[source] std::io::Error, PathBuf),
    #[error("failed to write the layout parameters to {1}")]
    Write(#[source] std::io::Error, PathBuf),
    #[error("invalid layout parameters")]
    Load(#[from] toml::de::Error),
    #[error("layout parameters are not representable in toml")]
    Save(#[from] toml::ser::Error),
}

/// ## `CylinderLayout` builder
impl CylinderLayoutBuilder {
    /// Reads the layout parameters from a toml file written by [save](Self::save)
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, LayoutBuilderError> {
        let path = path.as_ref();
        let toml =
            fs::read_to_string(path).map_err(|e| LayoutBuilderError::Read(e, path.into()))?;
        Ok(toml::from_str(&toml)?)
    }
    /// Writes the layout parameters to a toml file
    ///
    /// The file starts with a `# ::pmt_coverage::CylinderLayoutBuilder` comment line.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), LayoutBuilderError> {
        let path = path.as_ref();
        let contents = format!("{HEADER}\n\n{}", toml::to_string_pretty(self)?);
        fs::write(path, contents).map_err(|e| LayoutBuilderError::Write(e, path.into()))
    }
    /// Reads the PMT and vessel parameters from a configuration store
    ///
    /// The photocathode edge radius samples are read from `PMT[pmt_type].rho_edge` where
    /// `pmt_type` is given by `GEO[inner_pmts].pmt_type`, and the vessel dimensions from `GEO[shield]`.
    pub fn from_store<S: ConfigStore + ?Sized>(
        store: &S,
        photocathode_coverage: f64,
    ) -> Result<Self> {
        let pmt = store.link("GEO", "inner_pmts")?.follow("pmt_type", "PMT")?;
        let rho_edge = pmt.get_darray("rho_edge")?;
        if rho_edge.is_empty() {
            return Err(StoreError::EmptyArray {
                table: pmt.key().clone(),
                field: "rho_edge".into(),
            }
            .into());
        }
        let shield = store.link("GEO", "shield")?;
        Ok(Self {
            photocathode_coverage,
            rho_edge,
            vessel: Vessel {
                steel_thickness: shield.get_d("steel_thickness")?,
                shield_thickness: shield.get_d("shield_thickness")?,
                detector_size: shield.get_d("detector_size")?,
            },
        })
    }
    /// Set the fraction of the vessel surface covered by photocathodes
    pub fn photocathode_coverage(self, photocathode_coverage: f64) -> Self {
        Self {
            photocathode_coverage,
            ..self
        }
    }
    /// Set the photocathode edge radius samples
    pub fn rho_edge(self, rho_edge: Vec<f64>) -> Self {
        Self { rho_edge, ..self }
    }
    /// Set the photocathode radius
    pub fn photocathode_radius(self, photocathode_radius: f64) -> Self {
        Self {
            rho_edge: vec![photocathode_radius],
            ..self
        }
    }
    /// Set the vessel dimensions
    pub fn vessel(self, vessel: Vessel) -> Self {
        Self { vessel, ..self }
    }
    /// Set the thickness of the PMT support structure
    pub fn steel_thickness(mut self, steel_thickness: f64) -> Self {
        self.vessel.steel_thickness = steel_thickness;
        self
    }
    /// Set the thickness of the shield
    pub fn shield_thickness(mut self, shield_thickness: f64) -> Self {
        self.vessel.shield_thickness = shield_thickness;
        self
    }
    /// Set the detector size
    pub fn detector_size(mut self, detector_size: f64) -> Self {
        self.vessel.detector_size = detector_size;
        self
    }
}
impl Builder for CylinderLayoutBuilder {
    type Component = CylinderLayout;
    fn build(self) -> Result<CylinderLayout> {
        let geometry = self.vessel.geometry();
        log::debug!(
            "PMT radius: {}, cable radius: {}, top/bottom offset: {}",
            geometry.pmt_radius,
            geometry.cable_radius,
            geometry.topbot_offset
        );
        let solution =
            CoverageSolution::solve(&self.rho_edge, self.photocathode_coverage, &geometry)
                .ok_or(CoverageError::EmptyEdgeRadius)?;

        let barrel = BarrelGrid::new(&geometry, solution.pmt_space);
        if barrel.is_empty() {
            log::warn!(
                "empty barrel with {} columns and {} rows",
                barrel.cols,
                barrel.rows
            );
        }
        let endcap = EndcapLattice::new(&geometry, solution.pmt_space);

        let mut pmts = Vec::with_capacity(barrel.len() + 2 * endcap.len());
        pmts.extend(barrel.pmts());
        pmts.extend(endcap.pmts());
        let cables = cable_anchors(geometry.cable_radius, barrel.cols);

        Ok(CylinderLayout {
            vessel: self.vessel,
            geometry,
            solution,
            barrel,
            endcap,
            pmts,
            cables,
        })
    }
}
