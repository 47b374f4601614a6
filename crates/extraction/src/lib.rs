#![forbid(unsafe_code)]

//! Primitive extraction on top of the RANSAC estimators.
//!
//! Spheres are extracted once over the whole cloud ([`extract_sphere`]);
//! cylinders are extracted one after the other, each round working on the
//! points earlier rounds left unassigned ([`extract_sequential`]).

pub mod config;
pub mod error;
pub mod sequential;
pub mod single;

pub use config::{ConfigError, ExtractionConfig, Palette, PALETTE_SIZE};
pub use error::ExtractionError;
pub use sequential::{extract_sequential, Instance, RoundSummary, SequentialExtraction, StopReason};
pub use single::{extract_sphere, SphereExtraction, INLIER_COLOR, MARKER_COLOR, UNCLASSIFIED_COLOR};

use pointclouds_core::PointCloud;
use pointclouds_segmentation::CylinderModel;
use std::fmt;
use std::str::FromStr;

/// Primitive kinds the extraction front end knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Sphere,
    Cylinder,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::Sphere => write!(f, "sphere"),
            PrimitiveKind::Cylinder => write!(f, "cylinder"),
        }
    }
}

impl FromStr for PrimitiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sphere" => Ok(PrimitiveKind::Sphere),
            "cylinder" => Ok(PrimitiveKind::Cylinder),
            other => Err(format!("unknown primitive kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Sphere(SphereExtraction),
    Cylinders(SequentialExtraction<CylinderModel>),
}

impl Extraction {
    /// The colored output cloud.
    pub fn cloud(&self) -> &PointCloud {
        match self {
            Extraction::Sphere(s) => &s.cloud,
            Extraction::Cylinders(c) => &c.cloud,
        }
    }

    /// Consumes the result, keeping only the colored cloud.
    pub fn into_cloud(self) -> PointCloud {
        match self {
            Extraction::Sphere(s) => s.cloud,
            Extraction::Cylinders(c) => c.cloud,
        }
    }
}

/// Runs the extraction mode of `kind`: a single sphere, or up to
/// `config.effective_max_instances()` cylinders.
pub fn extract(
    kind: PrimitiveKind,
    cloud: &PointCloud,
    config: &ExtractionConfig,
) -> Result<Extraction, ExtractionError> {
    match kind {
        PrimitiveKind::Sphere => extract_sphere(cloud, config).map(Extraction::Sphere),
        PrimitiveKind::Cylinder => {
            extract_sequential::<CylinderModel>(cloud, config).map(Extraction::Cylinders)
        }
    }
}
