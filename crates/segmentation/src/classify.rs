use crate::model::ShapeModel;
use pointclouds_core::PointCloud;

/// Per-point inlier labels and distances against one model.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub distances: Vec<f32>,
    pub inliers: Vec<bool>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.inliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inliers.is_empty()
    }

    pub fn inlier_count(&self) -> usize {
        self.inliers.iter().filter(|&&b| b).count()
    }

    /// Ascending indices of the inliers.
    pub fn inlier_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.inliers
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    /// Ascending indices of the outliers.
    pub fn outlier_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.inliers
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| (!b).then_some(i))
    }
}

/// Labels every point of `cloud` as inlier (`distance <= threshold`) or
/// outlier of `model`. Points with a NaN distance are outliers.
pub fn classify<M: ShapeModel>(cloud: &PointCloud, model: &M, threshold: f32) -> Classification {
    let distances: Vec<f32> = cloud
        .iter_points()
        .map(|p| model.distance_to_point(&p))
        .collect();
    let inliers = distances.iter().map(|&d| d <= threshold).collect();
    Classification { distances, inliers }
}
