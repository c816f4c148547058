use std::path::PathBuf;

use crate::{layout::LayoutBuilderError, store::StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    #[error("could not load template {0}")]
    Template(String, #[source] StoreError),
    #[error("unresolved configuration: {0}")]
    Store(#[from] StoreError),
    #[error("the photocathode edge radius has no sample")]
    EmptyEdgeRadius,
    #[error("cannot build `::pmt_coverage::CylinderLayout`")]
    Builder(#[from] LayoutBuilderError),
    #[error("unknown detector factory: {0}")]
    UnknownFactory(String),
    #[error("cannot create file {1}")]
    File(#[source] std::io::Error, PathBuf),
    #[error("cannot serialize into pickle")]
    Pickle(#[from] serde_pickle::Error),
}
