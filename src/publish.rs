//!
//! # Layout publisher
//!
//! Writes a [CylinderLayout] into a configuration store:
//!  - `PMTINFO[]`: PMT positions, directions and types,
//!  - `cable_pos[]`: support cable anchors,
//!  - `GEO[shield]` and `GEO[inner_pmts]`: barrel grid dimensions and PMT ranges,
//!  - `GEO[veto_pmts]`: the veto PMT layout is disabled.
//!
//! The layout is fully computed before anything is written and the store writes cannot fail,
//! so either every table is updated or none is.

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    layout::{CableAnchor, PmtRecord},
    store::ConfigStore,
    CoverageError, CylinderLayout, Result,
};

/// PMT positions, directions and types as index aligned arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PmtInfo {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub dir_x: Vec<f64>,
    pub dir_y: Vec<f64>,
    pub dir_z: Vec<f64>,
    #[serde(rename = "type")]
    pub pmt_type: Vec<i64>,
}
impl From<&[PmtRecord]> for PmtInfo {
    fn from(pmts: &[PmtRecord]) -> Self {
        let mut info = PmtInfo::default();
        for pmt in pmts {
            info.x.push(pmt.position.x);
            info.y.push(pmt.position.y);
            info.z.push(pmt.position.z);
            info.dir_x.push(pmt.direction.x);
            info.dir_y.push(pmt.direction.y);
            info.dir_z.push(pmt.direction.z);
            info.pmt_type.push(pmt.pmt_type);
        }
        info
    }
}
impl PmtInfo {
    /// Number of PMTs
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    /// Reads the PMT info from the `PMTINFO[]` table of a store
    pub fn from_store<S: ConfigStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            x: store.get_darray(PMTINFO, "", "x")?,
            y: store.get_darray(PMTINFO, "", "y")?,
            z: store.get_darray(PMTINFO, "", "z")?,
            dir_x: store.get_darray(PMTINFO, "", "dir_x")?,
            dir_y: store.get_darray(PMTINFO, "", "dir_y")?,
            dir_z: store.get_darray(PMTINFO, "", "dir_z")?,
            pmt_type: store.get_iarray(PMTINFO, "", "type")?,
        })
    }
    /// Saves the PMT info into a pickle file
    pub fn to_pickle<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|e| CoverageError::File(e, path.into()))?;
        serde_pickle::to_writer(&mut file, self, Default::default())?;
        Ok(())
    }
}

/// Support cable anchors as index aligned arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CablePositions {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub dir_x: Vec<f64>,
    pub dir_y: Vec<f64>,
    pub dir_z: Vec<f64>,
}
impl From<&[CableAnchor]> for CablePositions {
    fn from(cables: &[CableAnchor]) -> Self {
        let mut positions = CablePositions::default();
        for cable in cables {
            positions.x.push(cable.position.x);
            positions.y.push(cable.position.y);
            positions.z.push(cable.position.z);
            positions.dir_x.push(cable.direction.x);
            positions.dir_y.push(cable.direction.y);
            positions.dir_z.push(cable.direction.z);
        }
        positions
    }
}
impl CablePositions {
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    /// Reads the cable anchors from the `cable_pos[]` table of a store
    pub fn from_store<S: ConfigStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            x: store.get_darray(CABLE_POS, "", "x")?,
            y: store.get_darray(CABLE_POS, "", "y")?,
            z: store.get_darray(CABLE_POS, "", "z")?,
            dir_x: store.get_darray(CABLE_POS, "", "dir_x")?,
            dir_y: store.get_darray(CABLE_POS, "", "dir_y")?,
            dir_z: store.get_darray(CABLE_POS, "", "dir_z")?,
        })
    }
}

const PMTINFO: &str = "PMTINFO";
const CABLE_POS: &str = "cable_pos";
const GEO: &str = "GEO";

impl CylinderLayout {
    /// PMT info arrays
    pub fn pmt_info(&self) -> PmtInfo {
        self.pmts().into()
    }
    /// Cable anchor arrays
    pub fn cable_positions(&self) -> CablePositions {
        self.cables().into()
    }
    /// Writes the layout into the store, overriding the default PMT info and cable positions
    /// and disabling the veto PMTs
    pub fn publish<S: ConfigStore + ?Sized>(&self, store: &mut S) {
        let n_pmt = self.n_pmt() as i64;

        log::info!("Override default PMTINFO information...");
        let PmtInfo {
            x,
            y,
            z,
            dir_x,
            dir_y,
            dir_z,
            pmt_type,
        } = self.pmt_info();
        store.set_darray(PMTINFO, "", "x", x);
        store.set_darray(PMTINFO, "", "y", y);
        store.set_darray(PMTINFO, "", "z", z);
        store.set_darray(PMTINFO, "", "dir_x", dir_x);
        store.set_darray(PMTINFO, "", "dir_y", dir_y);
        store.set_darray(PMTINFO, "", "dir_z", dir_z);
        store.set_iarray(PMTINFO, "", "type", pmt_type);

        log::info!("Disable veto_pmts for dynamic coverage...");
        store.set_i(GEO, "veto_pmts", "enable", 0);
        store.set_i(GEO, "shield", "veto_start", 0);
        store.set_i(GEO, "shield", "veto_len", 0);

        log::info!("Update geometry fields related to normal PMTs...");
        store.set_i(GEO, "shield", "cols", self.cols() as i64);
        store.set_i(GEO, "shield", "rows", self.rows() as i64);
        store.set_i(GEO, "shield", "inner_start", 0);
        store.set_i(GEO, "shield", "inner_len", n_pmt);
        store.set_i(GEO, "inner_pmts", "start_num", 0);
        store.set_i(GEO, "inner_pmts", "max_pmts", n_pmt);

        log::info!("Update cable positions to match shield...");
        let CablePositions {
            x,
            y,
            z,
            dir_x,
            dir_y,
            dir_z,
        } = self.cable_positions();
        store.set_darray(CABLE_POS, "", "x", x);
        store.set_darray(CABLE_POS, "", "y", y);
        store.set_darray(CABLE_POS, "", "z", z);
        store.set_darray(CABLE_POS, "", "dir_x", dir_x);
        store.set_darray(CABLE_POS, "", "dir_y", dir_y);
        store.set_darray(CABLE_POS, "", "dir_z", dir_z);
    }
}
