use pointclouds_core::PointCloud;
use std::fmt;

/// Contiguous copy of a cloud's positions (and normals, if any) for the
/// hot loops of model fitting and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    pub points: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
}

impl PointData {
    pub fn from_cloud(cloud: &PointCloud) -> Self {
        Self {
            points: cloud.to_points(),
            normals: cloud.normals.as_ref().map(|n| n.to_vec()),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Normal of point `i`, if the data carries normals.
    pub fn normal(&self, i: usize) -> Option<[f32; 3]> {
        self.normals.as_ref().map(|n| n[i])
    }
}

/// A geometric primitive that can be fitted from a minimal sample and
/// scored by point distance. `Display` renders the fitted parameters for
/// reports.
pub trait ShapeModel: Copy + Send + Sync + fmt::Debug + fmt::Display {
    /// Human-readable kind, used in logs and errors.
    const NAME: &'static str;

    /// Number of points in a minimal sample.
    const MIN_SAMPLES: usize;

    /// Whether [`ShapeModel::fit_minimal`] reads point normals.
    const REQUIRES_NORMALS: bool = false;

    /// Fits a candidate through the points at `sample` (exactly
    /// `MIN_SAMPLES` distinct indices). Returns `None` for degenerate
    /// samples.
    fn fit_minimal(data: &PointData, sample: &[usize]) -> Option<Self>;

    /// Unsigned distance from `point` to the model surface.
    fn distance_to_point(&self, point: &[f32; 3]) -> f32;

    /// Rejects numerically invalid models (non-finite parameters,
    /// non-positive radius, ...).
    fn is_valid(&self) -> bool;
}

#[inline]
pub(crate) fn sub(a: &[f32; 3], b: &[f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub(crate) fn dot(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn cross(a: &[f32; 3], b: &[f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub(crate) fn norm(a: &[f32; 3]) -> f32 {
    dot(a, a).sqrt()
}

#[inline]
pub(crate) fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}
