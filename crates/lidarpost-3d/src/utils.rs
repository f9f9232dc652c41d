/// Utility function to convert a 3x4 row-major array to a faer matrix view.
///
/// # Arguments
///
/// * `array` - A 3x4 array.
///
/// # Returns
///
/// A faer matrix 3x4.
pub(crate) fn array34_to_faer_mat34(array: &[[f64; 4]; 3]) -> faer::MatRef<'_, f64> {
    // SAFETY: [[f64; 4]; 3] is 12 contiguous f64 values in row-major order
    let array_slice =
        unsafe { std::slice::from_raw_parts(array.as_ptr() as *const f64, array.len() * 4) };
    faer::mat::from_row_major_slice(array_slice, 3, 4)
}

/// Utility function to view a slice of 3D points as a Nx3 faer matrix.
pub(crate) fn points_to_faer_mat(points: &[[f64; 3]]) -> faer::MatRef<'_, f64> {
    // SAFETY: [[f64; 3]] is 3 * N contiguous f64 values in row-major order
    let points_slice =
        unsafe { std::slice::from_raw_parts(points.as_ptr() as *const f64, points.len() * 3) };
    faer::mat::from_row_major_slice(points_slice, points.len(), 3)
}

/// Mean of a set of points, `None` when there are none.
pub(crate) fn centroid(points: &[[f64; 3]]) -> Option<[f64; 3]> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum = points.iter().fold([0.0; 3], |acc, p| {
        [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]
    });
    Some(sum.map(|v| v / n))
}
