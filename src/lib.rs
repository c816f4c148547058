//!
//! # PMT coverage crate
//!
//! Lays out the photomultiplier tubes (PMTs) of a cylindrical detector so that a requested
//! fraction of the vessel surface is covered by photocathodes.
//! The PMTs are arranged on a square grid on the barrel and on a square lattice truncated to
//! a disk on both end-caps, the support cable anchors follow the barrel columns.
//!
//! A layout is either computed from a [CylinderLayoutBuilder]:
//! ```rust
//! use pmt_coverage::{Builder, CylinderLayout, FromBuilder};
//! let layout = CylinderLayout::builder()
//!     .photocathode_coverage(0.2)
//!     .build()
//!     .unwrap();
//! println!("{}", layout.report());
//! ```
//! or from the tables of a configuration store, with the result written back into the store:
//! ```rust
//! use pmt_coverage::{construct_detector, ConfigStore, MemoryStore};
//! let mut store = MemoryStore::new().data_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
//! store.load("Watchman/DETECTOR.ratdb").unwrap();
//! construct_detector(&mut store).unwrap();
//! assert_eq!(store.get_i("GEO", "shield", "cols").unwrap(), 86);
//! ```

pub mod coverage;
pub mod error;
pub mod factory;
pub mod layout;
pub mod publish;
pub mod store;

#[doc(inline)]
pub use self::error::CoverageError;
#[doc(inline)]
pub use self::factory::{
    construct_detector, detector_factory, CylinderDetectorFactory, DetectorFactory,
};
#[doc(inline)]
pub use self::layout::{
    CoverageReport, CylinderLayout, CylinderLayoutBuilder, LayoutBuilderError,
};
#[doc(inline)]
pub use self::publish::{CablePositions, PmtInfo};
#[doc(inline)]
pub use self::store::{
    ConfigStore, Link, MemoryStore, NestedLink, StoreError, TableKey, Value,
};

pub type Result<T> = std::result::Result<T, CoverageError>;
/// Builder type trait
pub trait Builder: Default {
    type Component;
    fn new() -> Self {
        Default::default()
    }
    fn build(self) -> Result<Self::Component>;
}
/// Component builder accessor
pub trait FromBuilder: Sized {
    type ComponentBuilder: Builder<Component = Self>;
    fn builder() -> Self::ComponentBuilder {
        Self::ComponentBuilder::default()
    }
}
