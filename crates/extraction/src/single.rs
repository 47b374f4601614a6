use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use log::info;
use pointclouds_core::{PointCloud, Rgb};
use pointclouds_segmentation::{classify, ShapeModel, SphereModel};

/// Inlier color of single-instance extraction.
pub const INLIER_COLOR: Rgb = Rgb::GREEN;
/// Color of points matching no primitive.
pub const UNCLASSIFIED_COLOR: Rgb = Rgb::RED;
/// Color of the synthetic center marker.
pub const MARKER_COLOR: Rgb = Rgb::BLUE;

/// Result of [`extract_sphere`].
#[derive(Debug, Clone, PartialEq)]
pub struct SphereExtraction {
    /// Input points in input order, green or red, followed by one blue
    /// marker at the fitted center.
    pub cloud: PointCloud,
    pub model: SphereModel,
    pub inlier_count: usize,
    /// RANSAC candidates drawn.
    pub iterations: usize,
}

impl SphereExtraction {
    /// Number of input points; the marker is excluded.
    pub fn input_len(&self) -> usize {
        self.cloud.len() - 1
    }
}

/// Fits one sphere to the whole cloud and colors every point by membership.
///
/// Fails when the cloud is too small for a minimal sample, when no valid
/// candidate was found, or when the fitted model is degenerate.
pub fn extract_sphere(
    cloud: &PointCloud,
    config: &ExtractionConfig,
) -> Result<SphereExtraction, ExtractionError> {
    config.validate()?;

    let fit = config.fit::<SphereModel>(cloud, 0)?;
    if !fit.model.is_valid() {
        return Err(ExtractionError::DegenerateModel {
            model: SphereModel::NAME,
        });
    }

    let labels = classify(cloud, &fit.model, config.distance_threshold);

    let mut output = cloud.painted(UNCLASSIFIED_COLOR);
    if let Some(colors) = output.colors.as_mut() {
        for i in labels.inlier_indices() {
            colors.set(i, INLIER_COLOR);
        }
    }
    output.push_colored(fit.model.center, MARKER_COLOR);

    let inlier_count = labels.inlier_count();
    info!(
        "{}: {} inliers of {} points",
        fit.model,
        inlier_count,
        cloud.len()
    );

    Ok(SphereExtraction {
        cloud: output,
        model: fit.model,
        inlier_count,
        iterations: fit.iterations,
    })
}
