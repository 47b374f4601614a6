use pointclouds_core::PointCloud;

/// Drops points inside the sensor's blind spot.
///
/// A point is kept iff its Euclidean distance from the origin is strictly
/// greater than `min_range`. Non-finite points are always dropped. The
/// relative order of kept points is preserved.
pub fn range_filter(cloud: &PointCloud, min_range: f64) -> PointCloud {
    if cloud.is_empty() {
        return PointCloud::new();
    }

    let keep: Vec<usize> = (0..cloud.len())
        .filter(|&i| {
            let range = cloud.point_xyz(i).range();
            range.is_finite() && range > min_range
        })
        .collect();

    cloud.select(&keep)
}
