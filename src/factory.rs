//!
//! # Detector factories
//!
//! A detector factory defines the geometry of a detector in a configuration store.
//! The factory is selected with the field `DETECTOR[].detector_factory`, see [construct_detector].
//!
//! The only factory is [CylinderDetectorFactory] (`"Watchman"`): it loads the cylindrical
//! detector geometry template, computes the PMT layout matching `DETECTOR[].photocathode_coverage`
//! and writes the layout back into the store.

use crate::{
    store::{ConfigStore, TableKey},
    Builder, CoverageError, CoverageReport, CylinderLayout, CylinderLayoutBuilder, Result,
};

/// Detector factory interface
pub trait DetectorFactory {
    /// Defines the detector geometry in `store` from the detector parameters in table `detector`
    fn define_detector(
        &self,
        store: &mut dyn ConfigStore,
        detector: &TableKey,
    ) -> Result<CoverageReport>;
}

/// Cylindrical detector with a coverage driven PMT layout
///
/// Default properties:
///  - geometry template: `Watchman/Watchman.geo`
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderDetectorFactory {
    geo_template: String,
}
impl Default for CylinderDetectorFactory {
    fn default() -> Self {
        Self {
            geo_template: "Watchman/Watchman.geo".into(),
        }
    }
}
impl CylinderDetectorFactory {
    pub fn new() -> Self {
        Default::default()
    }
    /// Set the geometry template
    pub fn geo_template<S: Into<String>>(self, geo_template: S) -> Self {
        Self {
            geo_template: geo_template.into(),
        }
    }
    /// Computes the PMT layout and writes it into the store
    ///
    /// The photocathode coverage is read from `detector` before the geometry template is loaded.
    /// The template only provides defaults: geometry fields already set in the store are kept.
    /// Nothing but the template tables is written into the store if the layout cannot be computed.
    pub fn layout<S: ConfigStore + ?Sized>(
        &self,
        store: &mut S,
        detector: &TableKey,
    ) -> Result<CylinderLayout> {
        let photocathode_coverage =
            store.get_d(&detector.name, &detector.index, "photocathode_coverage")?;

        log::info!("Loading the geometry template {}", self.geo_template);
        store
            .load(&self.geo_template)
            .map_err(|e| CoverageError::Template(self.geo_template.clone(), e))?;

        let layout = CylinderLayoutBuilder::from_store(&*store, photocathode_coverage)?.build()?;
        log::info!("{}", layout.report());

        layout.publish(store);
        Ok(layout)
    }
}
impl DetectorFactory for CylinderDetectorFactory {
    fn define_detector(
        &self,
        store: &mut dyn ConfigStore,
        detector: &TableKey,
    ) -> Result<CoverageReport> {
        Ok(self.layout(store, detector)?.report())
    }
}

/// Returns the detector factory registered under `name`
pub fn detector_factory(name: &str) -> Option<Box<dyn DetectorFactory>> {
    match name {
        "Watchman" => Some(Box::new(CylinderDetectorFactory::default())),
        _ => None,
    }
}

/// Defines the detector selected by `DETECTOR[].detector_factory`
pub fn construct_detector(store: &mut dyn ConfigStore) -> Result<CoverageReport> {
    let detector = TableKey::new("DETECTOR", "");
    let name = store.get_s(&detector.name, &detector.index, "detector_factory")?;
    let factory = detector_factory(&name).ok_or(CoverageError::UnknownFactory(name))?;
    factory.define_detector(store, &detector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FromBuilder, MemoryStore, StoreError};

    fn store() -> MemoryStore {
        MemoryStore::new().data_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }

    #[test]
    fn watchman() {
        let mut store = store();
        store.set_field("DETECTOR", "", "detector_factory", "Watchman".into());
        store.set_d("DETECTOR", "", "photocathode_coverage", 0.4);
        let report = construct_detector(&mut store).unwrap();
        assert_eq!(report.generated_pmts, 3514);
        assert_eq!(
            store.get_darray("PMTINFO", "", "x").unwrap().len(),
            report.generated_pmts
        );
        assert_eq!(store.get_i("GEO", "veto_pmts", "enable").unwrap(), 0);
    }

    #[test]
    fn geometry_set_before_template() {
        let mut store = store();
        store.set_field("DETECTOR", "", "detector_factory", "Watchman".into());
        store.set_d("DETECTOR", "", "photocathode_coverage", 0.4);
        store.set_d("GEO", "shield", "detector_size", 16.0);
        let report = construct_detector(&mut store).unwrap();
        assert_eq!(store.get_d("GEO", "shield", "detector_size").unwrap(), 16.0);
        assert_eq!(
            store.get_d("GEO", "shield", "shield_thickness").unwrap(),
            0.2
        );
        let expected = CylinderLayout::builder()
            .detector_size(16.0)
            .build()
            .unwrap()
            .report();
        assert_eq!(report, expected);
        assert_ne!(report.cols, 86);
    }

    #[test]
    fn unknown_factory() {
        let mut store = store();
        store.set_field("DETECTOR", "", "detector_factory", "Kamland".into());
        assert!(matches!(
            construct_detector(&mut store),
            Err(CoverageError::UnknownFactory(name)) if name == "Kamland"
        ));
    }

    #[test]
    fn missing_coverage() {
        let mut store = store();
        let detector = TableKey::new("DETECTOR", "");
        let err = CylinderDetectorFactory::new()
            .layout(&mut store, &detector)
            .unwrap_err();
        assert!(matches!(err, CoverageError::Store(StoreError::Table(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_template() {
        let mut store = store();
        store.set_d("DETECTOR", "", "photocathode_coverage", 0.4);
        let detector = TableKey::new("DETECTOR", "");
        let err = CylinderDetectorFactory::new()
            .geo_template("Watchman/Watchman.gdml")
            .layout(&mut store, &detector)
            .unwrap_err();
        assert!(err.to_string().contains("Watchman/Watchman.gdml"));
        assert!(!store.has_table("PMTINFO", ""));
    }

    #[test]
    fn missing_pmt_type() {
        let mut store = store();
        store.set_d("DETECTOR", "", "photocathode_coverage", 0.4);
        store.set_field("GEO", "inner_pmts", "pmt_type", "r5912".into());
        let detector = TableKey::new("DETECTOR", "");
        let err = CylinderDetectorFactory::new()
            .layout(&mut store, &detector)
            .unwrap_err();
        assert!(matches!(err, CoverageError::Store(StoreError::Table(key)) if key == TableKey::new("PMT", "r5912")));
        assert!(!store.has_table("PMTINFO", ""));
        assert!(!store.has_table("cable_pos", ""));
        assert_eq!(store.get_i("GEO", "veto_pmts", "enable").unwrap(), 1);
    }
}
