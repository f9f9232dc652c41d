use crate::pointcloud::PointCloud;

/// Check whether all three coordinates of a point are exactly zero.
#[inline]
pub fn is_zero_point(point: &[f64; 3]) -> bool {
    point[0] == 0.0 && point[1] == 0.0 && point[2] == 0.0
}

/// Compute the keep-mask of a set of points.
///
/// The mask is `true` for every point that has at least one non-zero coordinate.
pub fn zero_point_mask(points: &[[f64; 3]]) -> Vec<bool> {
    points.iter().map(|p| !is_zero_point(p)).collect()
}

/// Remove the points whose coordinates are all exactly zero.
///
/// Livox sensors report missing returns as `(0, 0, 0)`. The remaining points keep
/// their relative order and the attributes are filtered with the same mask.
///
/// # Arguments
///
/// * `cloud` - The point cloud to clean.
///
/// # Returns
///
/// A new point cloud without zero points.
///
/// Example:
///
/// ```
/// use lidarpost_3d::clean::remove_zero_points;
/// use lidarpost_3d::pointcloud::PointCloud;
///
/// let cloud = PointCloud::from_points(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
/// let cleaned = remove_zero_points(&cloud);
/// assert_eq!(cleaned.points(), &[[1.0, 0.0, 0.0]]);
/// ```
pub fn remove_zero_points(cloud: &PointCloud) -> PointCloud {
    let mask = zero_point_mask(cloud.points());
    let num_removed = mask.iter().filter(|keep| !**keep).count();
    log::debug!(
        "removing {} zero points out of {}",
        num_removed,
        cloud.len()
    );

    if num_removed == 0 {
        return cloud.clone();
    }

    cloud.masked(&mask)
}
