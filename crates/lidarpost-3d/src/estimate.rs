use crate::error::Cloud3dError;
use crate::transforms::TransformMatrix;

/// The minimum number of correspondences that determine a 3x4 affine transform.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Result of the affine least-squares fit.
#[derive(Debug, Clone)]
pub struct AffineFit {
    /// The transform from the source to the target frame.
    pub transform: TransformMatrix,
    /// Singular values of the homogeneous source matrix, in non-increasing order.
    pub singular_values: [f64; 4],
    /// Numerical rank of the homogeneous source matrix.
    pub rank: usize,
    /// Root mean square distance between the transformed source and the target.
    pub rmse: f64,
}

/// Fit the affine transform that maps a set of points onto its correspondences.
///
/// Each source point is lifted to homogeneous form `(x, y, z, 1)` and the linear
/// least-squares problem `min || A X - B ||_F` is solved with a thin SVD of `A`,
/// where `A` is the Nx4 homogeneous source matrix and `B` the Nx3 target points.
/// Row `r` of the returned 3x4 transform is column `r` of `X`, so the translation
/// ends up in the last column.
///
/// # Arguments
///
/// * `points_in_src` - The source points.
/// * `points_in_dst` - The target points, element i corresponding to source point i.
///
/// # Errors
///
/// * [`Cloud3dError::DimensionMismatch`] if the sets differ in length or hold fewer
///   than [`MIN_CORRESPONDENCES`] points.
/// * [`Cloud3dError::RankDeficient`] if the source points are degenerate, e.g. all
///   coplanar or collinear, and do not fix every affine degree of freedom.
///
/// Example:
///
/// ```
/// use lidarpost_3d::estimate::fit_affine_transform;
///
/// let src = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let dst = src.map(|p| [p[0] + 5.0, p[1] + 5.0, p[2] + 5.0]);
/// let fit = fit_affine_transform(&src, &dst).unwrap();
/// assert!((fit.transform.translation()[0] - 5.0).abs() < 1e-9);
/// ```
pub fn fit_affine_transform(
    points_in_src: &[[f64; 3]],
    points_in_dst: &[[f64; 3]],
) -> Result<AffineFit, Cloud3dError> {
    if points_in_src.len() != points_in_dst.len() {
        return Err(Cloud3dError::DimensionMismatch {
            expected: points_in_src.len(),
            actual: points_in_dst.len(),
        });
    }

    let num_points = points_in_src.len();
    if num_points < MIN_CORRESPONDENCES {
        return Err(Cloud3dError::DimensionMismatch {
            expected: MIN_CORRESPONDENCES,
            actual: num_points,
        });
    }

    // homogeneous source points (N x 4) and target points (N x 3)
    let mat_a = faer::Mat::<f64>::from_fn(num_points, 4, |i, j| match j {
        3 => 1.0,
        _ => points_in_src[i][j],
    });
    let mat_b = faer::Mat::<f64>::from_fn(num_points, 3, |i, j| points_in_dst[i][j]);

    let svd = mat_a.thin_svd();
    let s = svd.s_diagonal();
    let singular_values = [s.read(0), s.read(1), s.read(2), s.read(3)];

    // same cut-off as LAPACK's gelsd with the default rcond
    let s_max = singular_values.iter().fold(0.0f64, |acc, v| acc.max(*v));
    let tolerance = f64::EPSILON * (num_points.max(4) as f64) * s_max;
    let rank = singular_values.iter().filter(|v| **v > tolerance).count();

    log::debug!(
        "affine fit over {} points: singular values {:?}, rank {}",
        num_points,
        singular_values,
        rank
    );

    if rank < 4 {
        return Err(Cloud3dError::RankDeficient { rank, required: 4 });
    }

    let s_min = singular_values.iter().fold(f64::INFINITY, |acc, v| acc.min(*v));
    if s_max / s_min > 1e12 {
        log::warn!(
            "source points are badly conditioned (condition number {:e})",
            s_max / s_min
        );
    }

    // X = V * S^-1 * U^T * B
    let mut utb = svd.u().transpose() * mat_b.as_ref();
    for (k, s_k) in singular_values.iter().enumerate() {
        for j in 0..3 {
            utb.write(k, j, utb.read(k, j) / s_k);
        }
    }
    let mat_x = svd.v() * utb.as_ref();

    let mut rows = [[0.0; 4]; 3];
    for (r, row) in rows.iter_mut().enumerate() {
        for (k, val) in row.iter_mut().enumerate() {
            *val = mat_x.read(k, r);
        }
    }
    let transform = TransformMatrix::new(rows);

    let rmse = {
        let sum_sq = points_in_src
            .iter()
            .zip(points_in_dst)
            .map(|(src, dst)| {
                let p = transform.apply(src);
                (p[0] - dst[0]).powi(2) + (p[1] - dst[1]).powi(2) + (p[2] - dst[2]).powi(2)
            })
            .sum::<f64>();
        (sum_sq / num_points as f64).sqrt()
    };

    Ok(AffineFit {
        transform,
        singular_values,
        rank,
        rmse,
    })
}

/// Estimate the affine transform between two corresponding point sets.
///
/// Shorthand for [`fit_affine_transform`] returning only the transform.
pub fn estimate_transform(
    points_in_src: &[[f64; 3]],
    points_in_dst: &[[f64; 3]],
) -> Result<TransformMatrix, Cloud3dError> {
    fit_affine_transform(points_in_src, points_in_dst).map(|fit| fit.transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::transform_points3d;
    use approx::assert_relative_eq;
    use rand::Rng;

    fn assert_transform_relative_eq(a: &TransformMatrix, b: &TransformMatrix, epsilon: f64) {
        for (row_a, row_b) in a.rows().iter().zip(b.rows()) {
            for (va, vb) in row_a.iter().zip(row_b) {
                assert_relative_eq!(va, vb, epsilon = epsilon);
            }
        }
    }

    #[test]
    fn test_fit_translation_only() -> Result<(), Box<dyn std::error::Error>> {
        let src = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let dst = src.map(|p| [p[0] + 5.0, p[1] + 5.0, p[2] + 5.0]);

        let fit = fit_affine_transform(&src, &dst)?;
        assert_eq!(fit.rank, 4);
        assert_relative_eq!(fit.rmse, 0.0, epsilon = 1e-9);

        let expected = TransformMatrix::new([
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, 5.0],
            [0.0, 0.0, 1.0, 5.0],
        ]);
        assert_transform_relative_eq(&fit.transform, &expected, 1e-9);
        Ok(())
    }

    #[test]
    fn test_fit_recovers_known_transform() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = rand::rng();
        let src = (0..50)
            .map(|_| {
                [
                    rng.random_range(-20.0..20.0),
                    rng.random_range(-20.0..20.0),
                    rng.random_range(-5.0..5.0),
                ]
            })
            .collect::<Vec<[f64; 3]>>();

        let rotation = TransformMatrix::from_axis_angle(&[0.1, 0.3, 1.0], 0.8)?;
        let expected =
            TransformMatrix::from_rotation_translation(&rotation.rotation(), &[314.5, -27.25, 12.0]);

        let mut dst = vec![[0.0; 3]; src.len()];
        transform_points3d(&src, &expected, &mut dst)?;

        let fit = fit_affine_transform(&src, &dst)?;
        assert_transform_relative_eq(&fit.transform, &expected, 1e-8);
        assert!(fit.rmse < 1e-8);
        Ok(())
    }

    #[test]
    fn test_fit_least_squares_with_noise() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = rand::rng();
        let src = (0..200)
            .map(|_| {
                [
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                ]
            })
            .collect::<Vec<[f64; 3]>>();
        let expected = TransformMatrix::from_axis_angle(&[1.0, 0.0, 0.0], -0.3)?
            .compose(&TransformMatrix::new([
                [1.0, 0.0, 0.0, 2.0],
                [0.0, 1.0, 0.0, 3.0],
                [0.0, 0.0, 1.0, 4.0],
            ]));
        let dst = src
            .iter()
            .map(|p| {
                let q = expected.apply(p);
                [
                    q[0] + rng.random_range(-1e-3..1e-3),
                    q[1] + rng.random_range(-1e-3..1e-3),
                    q[2] + rng.random_range(-1e-3..1e-3),
                ]
            })
            .collect::<Vec<_>>();

        let fit = fit_affine_transform(&src, &dst)?;
        assert_transform_relative_eq(&fit.transform, &expected, 1e-2);
        assert!(fit.rmse < 2e-3);
        Ok(())
    }

    #[test]
    fn test_fit_dimension_mismatch() {
        let src = [[0.0; 3]; 5];
        let dst = [[0.0; 3]; 4];
        assert!(matches!(
            fit_affine_transform(&src, &dst),
            Err(Cloud3dError::DimensionMismatch {
                expected: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_fit_too_few_points() {
        let src = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(matches!(
            estimate_transform(&src, &src),
            Err(Cloud3dError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_fit_coplanar_points_rank_deficient() {
        let src = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [2.0, 3.0, 0.0],
        ];
        assert!(matches!(
            fit_affine_transform(&src, &src),
            Err(Cloud3dError::RankDeficient {
                rank: 3,
                required: 4
            })
        ));
    }

    #[test]
    fn test_fit_collinear_points_rank_deficient() {
        let src = [
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [2.0, 2.0, 2.0],
            [3.0, 3.0, 3.0],
        ];
        assert!(matches!(
            fit_affine_transform(&src, &src),
            Err(Cloud3dError::RankDeficient { rank: 2, .. })
        ));
    }
}
