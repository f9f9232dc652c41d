use crate::error::Cloud3dError;
use crate::pointcloud::PointCloud;
use crate::transforms::TransformMatrix;
use crate::utils;

/// Transform a set of points using a 3x4 affine transform.
///
/// Every point is mapped as `dst = R * src + t`, where `R` is the leading 3x3 block
/// of the transform and `t` its last column.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `transform` - The transform from the source to the destination frame.
/// * `dst_points` - A pre-allocated vector to store the transformed points.
///
/// # Errors
///
/// Returns [`Cloud3dError::DimensionMismatch`] if `dst_points` does not have the
/// same length as `src_points`.
///
/// Example:
///
/// ```
/// use lidarpost_3d::linalg::transform_points3d;
/// use lidarpost_3d::transforms::TransformMatrix;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let transform = TransformMatrix::identity();
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points3d(&src_points, &transform, &mut dst_points).unwrap();
/// assert_eq!(dst_points, src_points);
/// ```
pub fn transform_points3d(
    src_points: &[[f64; 3]],
    transform: &TransformMatrix,
    dst_points: &mut [[f64; 3]],
) -> Result<(), Cloud3dError> {
    if src_points.len() != dst_points.len() {
        return Err(Cloud3dError::DimensionMismatch {
            expected: src_points.len(),
            actual: dst_points.len(),
        });
    }

    // create views of the rotation block and the translation column
    let dst_m_src = utils::array34_to_faer_mat34(transform.rows());
    let dst_r_src = dst_m_src.submatrix(0, 0, 3, 3);
    let [tx, ty, tz] = transform.translation();

    // create view of the source points as a Nx3 matrix
    let points_in_src = utils::points_to_faer_mat(src_points);

    // create a mutable view of the destination points
    let mut points_in_dst = {
        // SAFETY: dst_points is 3 * N contiguous f64 values; each column of the
        // 3xN column-major view is one 3D point
        let dst_points_slice = unsafe {
            std::slice::from_raw_parts_mut(
                dst_points.as_mut_ptr() as *mut f64,
                dst_points.len() * 3,
            )
        };
        faer::mat::from_column_major_slice_mut(dst_points_slice, 3, dst_points.len())
    };

    // perform the matrix multiplication
    faer::linalg::matmul::matmul(
        &mut points_in_dst,
        dst_r_src,
        points_in_src.transpose(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    for mut col in points_in_dst.col_iter_mut() {
        col.write(0, col.read(0) + tx);
        col.write(1, col.read(1) + ty);
        col.write(2, col.read(2) + tz);
    }

    Ok(())
}

/// Transform a point cloud, copying its attributes unchanged.
///
/// # Arguments
///
/// * `cloud` - The point cloud to transform.
/// * `transform` - The transform from the cloud frame to the destination frame.
///
/// # Returns
///
/// A new point cloud with the same length, order and attributes.
pub fn transform_pointcloud(
    cloud: &PointCloud,
    transform: &TransformMatrix,
) -> Result<PointCloud, Cloud3dError> {
    let mut dst_points = vec![[0.0; 3]; cloud.len()];
    transform_points3d(cloud.points(), transform, &mut dst_points)?;
    cloud.clone().with_points(dst_points)
}

/// Multiply two 3x3 matrices.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3], m: &mut [[f64; 3]; 3]) {
    for (i, row) in m.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
}

/// Multiply a 3x3 matrix with a 3D vector.
pub fn mat33_mul_vec3(a: &[[f64; 3]; 3], v: &[f64; 3], out: &mut [f64; 3]) {
    for (o, row) in out.iter_mut().zip(a) {
        *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
    }
}

/// Compute the determinant of a 3x3 matrix.
pub fn det_mat33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Invert a 3x3 matrix using its adjugate.
///
/// # Errors
///
/// Returns [`Cloud3dError::Singular`] if the determinant is too small to invert.
pub fn inverse_mat33(m: &[[f64; 3]; 3], inv: &mut [[f64; 3]; 3]) -> Result<(), Cloud3dError> {
    let det = det_mat33(m);
    let scale = m.iter().flatten().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || det.abs() <= f64::EPSILON * scale.powi(3) {
        return Err(Cloud3dError::Singular(det));
    }

    let inv_det = 1.0 / det;
    inv[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
    inv[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
    inv[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
    inv[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
    inv[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
    inv[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
    inv[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
    inv[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
    inv[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;

    Ok(())
}
