use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use pointclouds_core::{Normals, PointCloud};
use pointclouds_spatial::KdTree;
use rayon::prelude::*;

/// Estimate surface normals for each point in the cloud using PCA.
///
/// For each point, the `k` nearest neighbours (the point itself included)
/// are gathered and the eigenvector of their covariance with the smallest
/// eigenvalue is taken as the normal. Normals are oriented to face the
/// origin.
pub fn estimate_normals(cloud: &PointCloud, k: usize) -> Normals {
    estimate_normals_with_viewpoint(cloud, k, [0.0, 0.0, 0.0])
}

/// Same as [`estimate_normals`] but orients normals toward `viewpoint`.
///
/// Points with fewer than 3 neighbours (or a degenerate neighbourhood) get
/// the fallback normal `(0, 0, 1)`.
pub fn estimate_normals_with_viewpoint(
    cloud: &PointCloud,
    k: usize,
    viewpoint: [f32; 3],
) -> Normals {
    if cloud.is_empty() || k == 0 {
        return Normals {
            nx: vec![],
            ny: vec![],
            nz: vec![],
        };
    }

    let points = cloud.to_points();
    let tree = KdTree::build(&points);

    let normals: Vec<[f32; 3]> = points
        .par_iter()
        .map(|point| {
            let neighbours = tree.knn_indices(point, k);
            let normal = pca_normal(&points, &neighbours).unwrap_or([0.0, 0.0, 1.0]);
            orient_towards(normal, point, &viewpoint)
        })
        .collect();

    let mut out = Normals {
        nx: Vec::with_capacity(normals.len()),
        ny: Vec::with_capacity(normals.len()),
        nz: Vec::with_capacity(normals.len()),
    };
    for n in normals {
        out.nx.push(n[0]);
        out.ny.push(n[1]);
        out.nz.push(n[2]);
    }
    out
}

/// Returns `cloud` with normals attached, estimating them only if absent.
pub fn with_normals(cloud: &PointCloud, k: usize) -> PointCloud {
    let mut out = cloud.clone();
    if out.normals.is_none() {
        out.normals = Some(estimate_normals(cloud, k));
    }
    out
}

/// Smallest-eigenvalue eigenvector of the neighbourhood covariance.
fn pca_normal(points: &[[f32; 3]], neighbours: &[usize]) -> Option<[f32; 3]> {
    if neighbours.len() < 3 {
        return None;
    }

    let count = neighbours.len() as f64;
    let centroid = neighbours
        .iter()
        .map(|&i| to_vector(&points[i]))
        .sum::<Vector3<f64>>()
        / count;

    let covariance = neighbours
        .iter()
        .map(|&i| {
            let d = to_vector(&points[i]) - centroid;
            d * d.transpose()
        })
        .sum::<Matrix3<f64>>()
        / count;

    if !covariance.iter().all(|v| v.is_finite()) || covariance.norm() < 1e-30 {
        return None;
    }

    let eigen = SymmetricEigen::new(covariance);
    let normal = eigen.eigenvectors.column(eigen.eigenvalues.imin()).into_owned();
    let len = normal.norm();
    if len < 1e-12 {
        return None;
    }
    let n = normal / len;
    Some([n.x as f32, n.y as f32, n.z as f32])
}

fn orient_towards(normal: [f32; 3], point: &[f32; 3], viewpoint: &[f32; 3]) -> [f32; 3] {
    let dot = (0..3)
        .map(|a| normal[a] * (viewpoint[a] - point[a]))
        .sum::<f32>();
    if dot < 0.0 {
        [-normal[0], -normal[1], -normal[2]]
    } else {
        normal
    }
}

fn to_vector(p: &[f32; 3]) -> Vector3<f64> {
    Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Random points on the patch `[0, size]^2` of the plane z = 3.
    ///
    /// z carries a tiny jitter so no axis value repeats in the KdTree.
    fn plane_cloud(n: usize, size: f32, seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        let pts: Vec<[f32; 3]> = (0..n)
            .map(|_| {
                [
                    rng.gen_range(0.0..size),
                    rng.gen_range(0.0..size),
                    3.0 + rng.gen_range(-1e-5..1e-5),
                ]
            })
            .collect();
        PointCloud::from_points(&pts)
    }

    /// Random points on a z-aligned cylinder of radius `r` through (cx, cy).
    fn cylinder_cloud(n: usize, cx: f32, cy: f32, r: f32, seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        let pts: Vec<[f32; 3]> = (0..n)
            .map(|_| {
                let theta = rng.gen_range(0.0..std::f32::consts::TAU);
                let h = rng.gen_range(0.0..4.0);
                [cx + r * theta.cos(), cy + r * theta.sin(), h]
            })
            .collect();
        PointCloud::from_points(&pts)
    }

    #[test]
    fn plane_normals_point_to_viewpoint() {
        let cloud = plane_cloud(400, 2.0, 7);
        let normals = estimate_normals(&cloud, 10);
        assert_eq!(normals.len(), cloud.len());
        // Plane sits at z = 3 above the origin, so normals face -z.
        for i in 0..normals.len() {
            assert_abs_diff_eq!(normals.nz[i], -1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn custom_viewpoint_flips_orientation() {
        let cloud = plane_cloud(200, 2.0, 8);
        let normals = estimate_normals_with_viewpoint(&cloud, 10, [1.0, 1.0, 10.0]);
        for i in 0..normals.len() {
            assert!(normals.nz[i] > 0.99, "nz = {}", normals.nz[i]);
        }
    }

    #[test]
    fn cylinder_normals_are_radial() {
        let cloud = cylinder_cloud(2000, 5.0, -2.0, 1.0, 11);
        let normals = estimate_normals(&cloud, 12);
        let radial_count = (0..cloud.len())
            .filter(|&i| {
                let p = cloud.point(i);
                let radial = [p[0] - 5.0, p[1] + 2.0];
                let n = normals.get(i);
                let cos = (n[0] * radial[0] + n[1] * radial[1]).abs();
                n[2].abs() < 0.2 && cos > 0.95
            })
            .count();
        assert!(
            radial_count as f32 >= 0.98 * cloud.len() as f32,
            "only {} of {} normals are radial",
            radial_count,
            cloud.len()
        );
    }

    #[test]
    fn empty_cloud_and_zero_k() {
        assert!(estimate_normals(&PointCloud::new(), 10).is_empty());
        assert!(estimate_normals(&plane_cloud(10, 1.0, 1), 0).is_empty());
    }

    #[test]
    fn tiny_cloud_falls_back() {
        let cloud = PointCloud::from_points(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let normals = estimate_normals(&cloud, 5);
        assert_eq!(normals.get(0), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn with_normals_keeps_existing() {
        let mut cloud = plane_cloud(20, 1.0, 3);
        let fixed = Normals {
            nx: vec![1.0; 20],
            ny: vec![0.0; 20],
            nz: vec![0.0; 20],
        };
        cloud.normals = Some(fixed.clone());
        assert_eq!(with_normals(&cloud, 5).normals, Some(fixed));

        cloud.normals = None;
        assert_eq!(with_normals(&cloud, 5).normals.unwrap().len(), 20);
    }

    proptest! {
        #[test]
        fn normals_are_unit_length(seed in 0u64..500, n in 5usize..200) {
            let mut rng = StdRng::seed_from_u64(seed);
            let pts: Vec<[f32; 3]> = (0..n)
                .map(|_| [
                    rng.gen_range(-10.0f32..10.0),
                    rng.gen_range(-10.0f32..10.0),
                    rng.gen_range(-10.0f32..10.0),
                ])
                .collect();
            let normals = estimate_normals(&PointCloud::from_points(&pts), 6);
            prop_assert_eq!(normals.len(), n);
            for i in 0..n {
                let v = normals.get(i);
                let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
                prop_assert!((len - 1.0).abs() < 1e-3, "len = {}", len);
            }
        }
    }
}
