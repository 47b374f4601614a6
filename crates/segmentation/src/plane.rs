use crate::model::{all_finite, cross, dot, norm, sub, PointData, ShapeModel};
use crate::ransac::{ransac_fit, ransac_fit_seeded, FitError, RansacFit};
use pointclouds_core::PointCloud;
use std::fmt;

/// A 3D plane model in the form `n . x + d = 0`, where `n` is a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneModel {
    pub normal: [f32; 3],
    pub d: f32,
}

impl Default for PlaneModel {
    fn default() -> Self {
        Self {
            normal: [0.0, 0.0, 1.0],
            d: 0.0,
        }
    }
}

impl ShapeModel for PlaneModel {
    const NAME: &'static str = "plane";
    const MIN_SAMPLES: usize = 3;

    /// Plane through 3 points; `None` if they are collinear.
    fn fit_minimal(data: &PointData, sample: &[usize]) -> Option<Self> {
        let p0 = &data.points[sample[0]];
        let n = cross(
            &sub(&data.points[sample[1]], p0),
            &sub(&data.points[sample[2]], p0),
        );

        let len = norm(&n);
        if len < 1e-10 {
            return None;
        }

        let normal = [n[0] / len, n[1] / len, n[2] / len];
        Some(Self {
            normal,
            d: -dot(&normal, p0),
        })
    }

    /// Assumes `normal` is a unit vector.
    #[inline]
    fn distance_to_point(&self, point: &[f32; 3]) -> f32 {
        (dot(&self.normal, point) + self.d).abs()
    }

    fn is_valid(&self) -> bool {
        all_finite(&self.normal) && self.d.is_finite() && (norm(&self.normal) - 1.0).abs() < 1e-3
    }
}

impl fmt::Display for PlaneModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plane nx:{:.6} ny:{:.6} nz:{:.6} d:{:.6}",
            self.normal[0], self.normal[1], self.normal[2], self.d
        )
    }
}

/// Fits a plane with RANSAC using a random seed.
pub fn ransac_plane(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
) -> Result<RansacFit<PlaneModel>, FitError> {
    ransac_fit(cloud, distance_threshold, iterations)
}

/// Fits a plane with RANSAC; identical seeds give identical results.
pub fn ransac_plane_seeded(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
    seed: u64,
) -> Result<RansacFit<PlaneModel>, FitError> {
    ransac_fit_seeded(cloud, distance_threshold, iterations, seed)
}
