#![forbid(unsafe_code)]

//! Sphere and cylinder extraction from 3D point clouds.
//!
//! Umbrella crate re-exporting the workspace crates.

pub use pointclouds_core as core;
pub use pointclouds_extraction as extraction;
pub use pointclouds_filters as filters;
pub use pointclouds_io as io;
pub use pointclouds_normals as normals;
pub use pointclouds_segmentation as segmentation;
pub use pointclouds_spatial as spatial;

pub use pointclouds_core::{PointCloud, Rgb};
pub use pointclouds_extraction::{extract, Extraction, ExtractionConfig, PrimitiveKind};
