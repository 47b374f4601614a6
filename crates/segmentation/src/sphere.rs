use crate::model::{all_finite, norm, sub, PointData, ShapeModel};
use crate::ransac::{ransac_fit, ransac_fit_seeded, FitError, RansacFit};
use nalgebra::{Matrix4, Vector4};
use pointclouds_core::PointCloud;
use std::fmt;

/// A sphere given by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereModel {
    pub center: [f32; 3],
    pub radius: f32,
}

impl SphereModel {
    /// `[cx, cy, cz, r]`.
    pub fn parameters(&self) -> [f32; 4] {
        [self.center[0], self.center[1], self.center[2], self.radius]
    }
}

impl ShapeModel for SphereModel {
    const NAME: &'static str = "sphere";
    const MIN_SAMPLES: usize = 4;

    /// Sphere through 4 points.
    ///
    /// Solves `|q|^2 + D qx + E qy + F qz + G = 0` for the sample shifted to
    /// its centroid. Coplanar (or near coplanar) samples have no unique
    /// sphere and yield `None`.
    fn fit_minimal(data: &PointData, sample: &[usize]) -> Option<Self> {
        let pts: Vec<[f64; 3]> = sample
            .iter()
            .map(|&i| {
                let p = data.points[i];
                [p[0] as f64, p[1] as f64, p[2] as f64]
            })
            .collect();

        let mut origin = [0.0f64; 3];
        for p in &pts {
            for a in 0..3 {
                origin[a] += p[a] / pts.len() as f64;
            }
        }

        let mut m = Matrix4::<f64>::zeros();
        let mut rhs = Vector4::<f64>::zeros();
        let mut scale = 0.0f64;
        for (row, p) in pts.iter().enumerate() {
            let q = [p[0] - origin[0], p[1] - origin[1], p[2] - origin[2]];
            let sq = q[0] * q[0] + q[1] * q[1] + q[2] * q[2];
            m[(row, 0)] = q[0];
            m[(row, 1)] = q[1];
            m[(row, 2)] = q[2];
            m[(row, 3)] = 1.0;
            rhs[row] = -sq;
            scale = scale.max(sq.sqrt());
        }

        if scale < 1e-12 || m.determinant().abs() <= 1e-9 * scale.powi(3) {
            return None;
        }

        let coeffs = m.lu().solve(&rhs)?;
        let c = [-coeffs[0] / 2.0, -coeffs[1] / 2.0, -coeffs[2] / 2.0];
        let r2 = c[0] * c[0] + c[1] * c[1] + c[2] * c[2] - coeffs[3];
        if r2 <= 0.0 {
            return None;
        }

        Some(Self {
            center: [
                (origin[0] + c[0]) as f32,
                (origin[1] + c[1]) as f32,
                (origin[2] + c[2]) as f32,
            ],
            radius: r2.sqrt() as f32,
        })
    }

    /// `| |p - center| - radius |`
    #[inline]
    fn distance_to_point(&self, point: &[f32; 3]) -> f32 {
        (norm(&sub(point, &self.center)) - self.radius).abs()
    }

    fn is_valid(&self) -> bool {
        all_finite(&self.parameters()) && self.radius > 0.0
    }
}

impl fmt::Display for SphereModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sphere px:{:.6} py:{:.6} pz:{:.6} r:{:.6}",
            self.center[0], self.center[1], self.center[2], self.radius
        )
    }
}

/// Fits a sphere with RANSAC using a random seed.
pub fn ransac_sphere(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
) -> Result<RansacFit<SphereModel>, FitError> {
    ransac_fit(cloud, distance_threshold, iterations)
}

/// Fits a sphere with RANSAC; identical seeds give identical results.
pub fn ransac_sphere_seeded(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
    seed: u64,
) -> Result<RansacFit<SphereModel>, FitError> {
    ransac_fit_seeded(cloud, distance_threshold, iterations, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    /// Points on a sphere, on a latitude/longitude grid (poles excluded).
    fn sphere_cloud(center: [f32; 3], radius: f32, n_lat: usize, n_lon: usize) -> PointCloud {
        let mut pts = Vec::new();
        for i in 1..n_lat {
            let theta = std::f32::consts::PI * i as f32 / n_lat as f32;
            for j in 0..n_lon {
                let phi = std::f32::consts::TAU * j as f32 / n_lon as f32;
                pts.push([
                    center[0] + radius * theta.sin() * phi.cos(),
                    center[1] + radius * theta.sin() * phi.sin(),
                    center[2] + radius * theta.cos(),
                ]);
            }
        }
        PointCloud::from_points(&pts)
    }

    fn fit_sample(points: &[[f32; 3]]) -> Option<SphereModel> {
        let data = PointData {
            points: points.to_vec(),
            normals: None,
        };
        let sample: Vec<usize> = (0..points.len()).collect();
        SphereModel::fit_minimal(&data, &sample)
    }

    #[test]
    fn minimal_fit_recovers_unit_sphere() {
        let model = fit_sample(&[
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ])
        .unwrap();
        assert_abs_diff_eq!(model.radius, 1.0, epsilon = 1e-5);
        for c in model.center {
            assert_abs_diff_eq!(c, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn minimal_fit_far_from_origin() {
        let c = [100.0, -50.0, 20.0];
        let model = fit_sample(&[
            [c[0] + 2.0, c[1], c[2]],
            [c[0], c[1] + 2.0, c[2]],
            [c[0], c[1], c[2] + 2.0],
            [c[0] - 2.0, c[1], c[2]],
        ])
        .unwrap();
        assert_abs_diff_eq!(model.radius, 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(model.center[0], 100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(model.center[1], -50.0, epsilon = 1e-3);
        assert_abs_diff_eq!(model.center[2], 20.0, epsilon = 1e-3);
    }

    #[test]
    fn coplanar_sample_is_degenerate() {
        assert!(fit_sample(&[
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
        ])
        .is_none());
    }

    #[test]
    fn coincident_sample_is_degenerate() {
        assert!(fit_sample(&[[1.0, 1.0, 1.0]; 4]).is_none());
    }

    #[test]
    fn five_points_on_unit_sphere() {
        let cloud = PointCloud::from_points(&[
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        let fit = ransac_sphere_seeded(&cloud, 0.01, 100, 7).unwrap();
        assert_eq!(fit.inlier_count, 5);
        assert_abs_diff_eq!(fit.model.radius, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn sphere_with_outliers() {
        let mut pts = sphere_cloud([3.0, 4.0, 5.0], 2.0, 10, 16).to_points();
        let n_sphere = pts.len();
        for i in 0..20 {
            pts.push([i as f32, 20.0, -(i as f32)]);
        }
        let cloud = PointCloud::from_points(&pts);
        let fit = ransac_sphere_seeded(&cloud, 0.05, 500, 42).unwrap();

        assert_eq!(fit.inlier_count, n_sphere);
        assert_abs_diff_eq!(fit.model.radius, 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.model.center[2], 5.0, epsilon = 1e-3);
    }

    #[test]
    fn validity_rejects_bad_radius() {
        let bad = SphereModel {
            center: [0.0; 3],
            radius: 0.0,
        };
        assert!(!bad.is_valid());
        let nan = SphereModel {
            center: [f32::NAN, 0.0, 0.0],
            radius: 1.0,
        };
        assert!(!nan.is_valid());
    }

    #[test]
    fn distance_is_radial_offset() {
        let model = SphereModel {
            center: [1.0, 1.0, 1.0],
            radius: 2.0,
        };
        assert_abs_diff_eq!(model.distance_to_point(&[1.0, 1.0, 4.0]), 1.0);
        assert_abs_diff_eq!(model.distance_to_point(&[1.0, 1.0, 1.0]), 2.0);
        assert_abs_diff_eq!(model.distance_to_point(&[3.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn display_lists_parameters() {
        let model = SphereModel {
            center: [0.0, 1.0, 2.0],
            radius: 0.5,
        };
        assert_eq!(
            model.to_string(),
            "sphere px:0.000000 py:1.000000 pz:2.000000 r:0.500000"
        );
    }

    proptest! {
        #[test]
        fn minimal_fit_passes_through_sample(
            cx in -50.0f32..50.0, cy in -50.0f32..50.0, cz in -50.0f32..50.0,
            r in 0.5f32..20.0,
            angles in prop::collection::vec((0.3f32..2.8, 0.0f32..6.28), 4),
        ) {
            let pts: Vec<[f32; 3]> = angles
                .iter()
                .map(|&(t, p)| [
                    cx + r * t.sin() * p.cos(),
                    cy + r * t.sin() * p.sin(),
                    cz + r * t.cos(),
                ])
                .collect();
            if let Some(model) = fit_sample(&pts) {
                for p in &pts {
                    prop_assert!(model.distance_to_point(p) < 1e-3 + 1e-4 * model.radius);
                }
            }
        }
    }
}
