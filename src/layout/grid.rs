use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::{CableAnchor, PmtRecord, INNER_PMT_TYPE};
use crate::coverage::VesselGeometry;

/// Barrel PMT grid
///
/// The number of columns and rows are rounded independently to the nearest multiple of the pitch,
/// so the grid cells are only approximately square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrelGrid {
    pub cols: usize,
    pub rows: usize,
    pub pmt_radius: f64,
    pub topbot_offset: f64,
    pub pmt_space: f64,
}
impl BarrelGrid {
    pub fn new(geometry: &VesselGeometry, pmt_space: f64) -> Self {
        Self {
            cols: (2.0 * PI * geometry.pmt_radius / pmt_space).round() as usize,
            rows: (2.0 * geometry.topbot_offset / pmt_space).round() as usize,
            pmt_radius: geometry.pmt_radius,
            topbot_offset: geometry.topbot_offset,
            pmt_space,
        }
    }
    /// Number of barrel PMTs
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Azimuth of a column, offset by half a cell from the x-axis
    pub fn azimuth(&self, col: usize) -> f64 {
        2.0 * PI * (col as f64 + 0.5) / self.cols as f64
    }
    /// Height of a row
    pub fn height(&self, row: usize) -> f64 {
        row as f64 * 2.0 * self.topbot_offset / self.rows as f64 + self.pmt_space / 2.0
            - self.topbot_offset
    }
    /// Iterator over the barrel PMTs in linear index order, facing the cylinder axis
    pub fn pmts(&self) -> impl Iterator<Item = PmtRecord> + '_ {
        (0..self.cols).flat_map(move |col| {
            let (sin_phi, cos_phi) = self.azimuth(col).sin_cos();
            (0..self.rows).map(move |row| PmtRecord {
                position: Vector3::new(
                    self.pmt_radius * cos_phi,
                    self.pmt_radius * sin_phi,
                    self.height(row),
                ),
                direction: Vector3::new(-cos_phi, -sin_phi, 0.0),
                pmt_type: INNER_PMT_TYPE,
            })
        })
    }
}

/// End-cap square lattice truncated to a disk
///
/// A lattice point is kept if a PMT centered on it, with a footprint of half the pitch,
/// lies entirely within the end-cap.
/// The same lattice is used for the top and bottom end-caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndcapLattice {
    pub rdim: i64,
    pub pmt_space: f64,
    pub topbot_offset: f64,
    points: Vec<(i64, i64)>,
}
impl EndcapLattice {
    pub fn new(geometry: &VesselGeometry, pmt_space: f64) -> Self {
        let rdim = (geometry.pmt_radius / pmt_space).round() as i64;
        let r_max = geometry.pmt_radius - pmt_space / 2.0;
        let points = (-rdim..=rdim)
            .flat_map(|i| (-rdim..=rdim).map(move |j| (i, j)))
            .filter(|(i, j)| pmt_space * ((i * i + j * j) as f64).sqrt() <= r_max)
            .collect();
        Self {
            rdim,
            pmt_space,
            topbot_offset: geometry.topbot_offset,
            points,
        }
    }
    /// Number of lattice points on one end-cap
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    /// Lattice points in enumeration order (row-major over `i` then `j`)
    pub fn points(&self) -> &[(i64, i64)] {
        &self.points
    }
    /// Iterator over the end-cap PMTs, alternating top and bottom PMTs of the same lattice point
    ///
    /// Top PMTs face down and bottom PMTs face up.
    pub fn pmts(&self) -> impl Iterator<Item = PmtRecord> + '_ {
        self.points.iter().flat_map(move |&(i, j)| {
            let x = self.pmt_space * i as f64;
            let y = self.pmt_space * j as f64;
            [
                PmtRecord {
                    position: Vector3::new(x, y, self.topbot_offset),
                    direction: Vector3::new(0.0, 0.0, -1.0),
                    pmt_type: INNER_PMT_TYPE,
                },
                PmtRecord {
                    position: Vector3::new(x, y, -self.topbot_offset),
                    direction: Vector3::new(0.0, 0.0, 1.0),
                    pmt_type: INNER_PMT_TYPE,
                },
            ]
        })
    }
}

/// Returns one cable anchor per barrel column, on the equator of the cable ring
pub fn cable_anchors(cable_radius: f64, cols: usize) -> Vec<CableAnchor> {
    (0..cols)
        .map(|col| {
            let (sin_phi, cos_phi) = (col as f64 * 2.0 * PI / cols as f64).sin_cos();
            CableAnchor {
                position: Vector3::new(cable_radius * cos_phi, cable_radius * sin_phi, 0.0),
                direction: Vector3::z(),
            }
        })
        .collect()
}
