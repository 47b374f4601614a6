use crate::model::{all_finite, cross, dot, norm, sub, PointData, ShapeModel};
use crate::ransac::{ransac_fit, ransac_fit_seeded, FitError, RansacFit};
use pointclouds_core::PointCloud;
use std::fmt;

/// An infinite circular cylinder.
///
/// `axis_point` is the point of the axis closest to the origin and
/// `axis_direction` is a unit vector whose largest-magnitude component is
/// positive, so equal cylinders have equal parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderModel {
    pub axis_point: [f32; 3],
    pub axis_direction: [f32; 3],
    pub radius: f32,
}

impl CylinderModel {
    /// Builds a cylinder from any point on the axis and any non-zero axis
    /// direction. Returns `None` for a zero direction.
    pub fn new(axis_point: [f32; 3], axis_direction: [f32; 3], radius: f32) -> Option<Self> {
        let len = norm(&axis_direction);
        if !(len > 1e-12) {
            return None;
        }
        let mut dir = axis_direction.map(|c| c / len);

        let dominant = dir
            .iter()
            .copied()
            .fold(0.0f32, |acc, c| if c.abs() > acc.abs() { c } else { acc });
        if dominant < 0.0 {
            dir = dir.map(|c| -c);
        }

        let t = dot(&axis_point, &dir);
        let foot = [
            axis_point[0] - t * dir[0],
            axis_point[1] - t * dir[1],
            axis_point[2] - t * dir[2],
        ];

        Some(Self {
            axis_point: foot,
            axis_direction: dir,
            radius,
        })
    }

    /// Perpendicular distance from `point` to the axis line.
    #[inline]
    pub fn axis_distance(&self, point: &[f32; 3]) -> f32 {
        let v = sub(point, &self.axis_point);
        let along = dot(&v, &self.axis_direction);
        let perp = [
            v[0] - along * self.axis_direction[0],
            v[1] - along * self.axis_direction[1],
            v[2] - along * self.axis_direction[2],
        ];
        norm(&perp)
    }

    /// `[px, py, pz, dx, dy, dz, r]`.
    pub fn parameters(&self) -> [f32; 7] {
        let [px, py, pz] = self.axis_point;
        let [dx, dy, dz] = self.axis_direction;
        [px, py, pz, dx, dy, dz, self.radius]
    }
}

impl ShapeModel for CylinderModel {
    const NAME: &'static str = "cylinder";
    const MIN_SAMPLES: usize = 2;
    const REQUIRES_NORMALS: bool = true;

    /// Cylinder through 2 oriented points.
    ///
    /// Both normal lines meet the axis, so the axis runs along `n1 x n2`
    /// through the closest points of the two normal lines. `None` when the
    /// normals are (nearly) parallel.
    fn fit_minimal(data: &PointData, sample: &[usize]) -> Option<Self> {
        let (i1, i2) = (sample[0], sample[1]);
        let (p1, p2) = (data.points[i1], data.points[i2]);
        let n1 = unit(data.normal(i1)?)?;
        let n2 = unit(data.normal(i2)?)?;

        let axis = cross(&n1, &n2);
        if norm(&axis) < 1e-4 {
            return None;
        }

        // Closest points between p1 + t n1 and p2 + s n2.
        let w0 = sub(&p1, &p2);
        let b = dot(&n1, &n2);
        let d = dot(&n1, &w0);
        let e = dot(&n2, &w0);
        let denom = 1.0 - b * b;
        let t = (b * e - d) / denom;
        let s = (e - b * d) / denom;

        let c1 = [p1[0] + t * n1[0], p1[1] + t * n1[1], p1[2] + t * n1[2]];
        let c2 = [p2[0] + s * n2[0], p2[1] + s * n2[1], p2[2] + s * n2[2]];
        let on_axis = [
            0.5 * (c1[0] + c2[0]),
            0.5 * (c1[1] + c2[1]),
            0.5 * (c1[2] + c2[2]),
        ];

        let mut model = Self::new(on_axis, axis, 0.0)?;
        model.radius = 0.5 * (model.axis_distance(&p1) + model.axis_distance(&p2));
        Some(model)
    }

    /// `| axis distance - radius |`
    #[inline]
    fn distance_to_point(&self, point: &[f32; 3]) -> f32 {
        (self.axis_distance(point) - self.radius).abs()
    }

    fn is_valid(&self) -> bool {
        all_finite(&self.parameters())
            && self.radius > 0.0
            && (norm(&self.axis_direction) - 1.0).abs() < 1e-3
    }
}

impl fmt::Display for CylinderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [px, py, pz, dx, dy, dz, r] = self.parameters();
        write!(
            f,
            "cylinder px:{:.6} py:{:.6} pz:{:.6} dx:{:.6} dy:{:.6} dz:{:.6} r:{:.6}",
            px, py, pz, dx, dy, dz, r
        )
    }
}

fn unit(v: [f32; 3]) -> Option<[f32; 3]> {
    let len = norm(&v);
    (len > 1e-6 && len.is_finite()).then(|| v.map(|c| c / len))
}

/// Fits a cylinder with RANSAC using a random seed. The cloud must carry
/// normals.
pub fn ransac_cylinder(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
) -> Result<RansacFit<CylinderModel>, FitError> {
    ransac_fit(cloud, distance_threshold, iterations)
}

/// Fits a cylinder with RANSAC; identical seeds give identical results.
/// The cloud must carry normals.
pub fn ransac_cylinder_seeded(
    cloud: &PointCloud,
    distance_threshold: f32,
    iterations: usize,
    seed: u64,
) -> Result<RansacFit<CylinderModel>, FitError> {
    ransac_fit_seeded(cloud, distance_threshold, iterations, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify;
    use approx::assert_abs_diff_eq;
    use pointclouds_core::Normals;
    use pointclouds_normals::estimate_normals;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Random points on a z-aligned cylinder with exact radial normals.
    fn oriented_cylinder(n: usize, cx: f32, cy: f32, r: f32, seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pts = Vec::with_capacity(n);
        let mut normals = Normals {
            nx: Vec::with_capacity(n),
            ny: Vec::with_capacity(n),
            nz: Vec::with_capacity(n),
        };
        for _ in 0..n {
            let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            let h: f32 = rng.gen_range(0.0..5.0);
            pts.push([cx + r * theta.cos(), cy + r * theta.sin(), h]);
            normals.nx.push(theta.cos());
            normals.ny.push(theta.sin());
            normals.nz.push(0.0);
        }
        let mut cloud = PointCloud::from_points(&pts);
        cloud.normals = Some(normals);
        cloud
    }

    fn fit_pair(p: [[f32; 3]; 2], n: [[f32; 3]; 2]) -> Option<CylinderModel> {
        let data = PointData {
            points: p.to_vec(),
            normals: Some(n.to_vec()),
        };
        CylinderModel::fit_minimal(&data, &[0, 1])
    }

    #[test]
    fn minimal_fit_from_two_oriented_points() {
        let model = fit_pair(
            [[3.0, 0.0, 1.0], [0.0, 3.0, 4.0]],
            [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
        )
        .unwrap();
        assert_abs_diff_eq!(model.radius, 3.0, epsilon = 1e-5);
        assert_eq!(model.axis_direction, [0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(norm(&model.axis_point), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn parallel_normals_are_degenerate() {
        assert!(fit_pair(
            [[1.0, 0.0, 0.0], [1.0, 0.0, 2.0]],
            [[1.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        )
        .is_none());
        assert!(fit_pair(
            [[1.0, 0.0, 0.0], [-1.0, 0.0, 2.0]],
            [[1.0, 0.0, 0.0], [-1.0, 0.0, 0.0]],
        )
        .is_none());
    }

    #[test]
    fn zero_normal_is_degenerate() {
        assert!(fit_pair(
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .is_none());
    }

    #[test]
    fn canonical_form_is_unique() {
        let a = CylinderModel::new([5.0, 2.0, 10.0], [0.0, 0.0, -3.0], 1.0).unwrap();
        let b = CylinderModel::new([5.0, 2.0, -4.0], [0.0, 0.0, 1.0], 1.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.axis_point, [5.0, 2.0, 0.0]);
        assert!(CylinderModel::new([0.0; 3], [0.0; 3], 1.0).is_none());
    }

    #[test]
    fn distance_to_tilted_cylinder() {
        let s = 0.5f32.sqrt();
        let model = CylinderModel::new([0.0; 3], [s, s, 0.0], 2.0).unwrap();
        // (1, -1, 0) is perpendicular to the axis at distance sqrt(2).
        assert_abs_diff_eq!(model.axis_distance(&[1.0, -1.0, 0.0]), 2.0f32.sqrt(), epsilon = 1e-5);
        assert_abs_diff_eq!(
            model.distance_to_point(&[1.0, -1.0, 7.0]),
            (7.0f32.powi(2) + 2.0).sqrt() - 2.0,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(model.distance_to_point(&[10.0, 10.0, 2.0]), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn ransac_requires_normals() {
        let cloud = PointCloud::from_points(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(
            ransac_cylinder_seeded(&cloud, 0.1, 10, 1).unwrap_err(),
            FitError::MissingNormals { model: "cylinder" }
        );
    }

    #[test]
    fn ransac_with_exact_normals() {
        let cloud = oriented_cylinder(300, 2.0, -1.0, 0.75, 5);
        let fit = ransac_cylinder_seeded(&cloud, 0.01, 50, 9).unwrap();
        assert_eq!(fit.inlier_count, 300);
        assert_abs_diff_eq!(fit.model.radius, 0.75, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.model.axis_direction[2], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(fit.model.axis_point[0], 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.model.axis_point[1], -1.0, epsilon = 1e-3);
    }

    #[test]
    fn ransac_with_estimated_normals_and_clutter() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut pts = oriented_cylinder(1500, 0.0, 0.0, 1.0, 3).to_points();
        for _ in 0..100 {
            pts.push([
                rng.gen_range(3.0..8.0),
                rng.gen_range(3.0..8.0),
                rng.gen_range(0.0..5.0),
            ]);
        }
        let mut cloud = PointCloud::from_points(&pts);
        cloud.normals = Some(estimate_normals(&cloud, 12));

        let fit = ransac_cylinder_seeded(&cloud, 0.15, 500, 21).unwrap();
        assert_abs_diff_eq!(fit.model.radius, 1.0, epsilon = 0.1);
        assert!(fit.model.axis_direction[2] > 0.97, "{}", fit.model);

        let labels = classify(&cloud, &fit.model, 0.15);
        let cylinder_hits = labels.inlier_indices().filter(|&i| i < 1500).count();
        assert!(cylinder_hits >= 1275, "only {} cylinder inliers", cylinder_hits);
        let clutter_hits = labels.inlier_indices().filter(|&i| i >= 1500).count();
        assert_eq!(clutter_hits, 0);
    }
}
