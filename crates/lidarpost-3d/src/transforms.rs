use crate::error::Cloud3dError;
use crate::linalg;

/// An affine 3D transform stored as a 3x4 row-major matrix.
///
/// The leading 3x3 block holds the rotation (and possibly scale or shear) and
/// the last column holds the translation, i.e. `p' = R * p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix {
    rows: [[f64; 4]; 3],
}

impl TransformMatrix {
    /// Create a transform from its 3x4 rows.
    pub fn new(rows: [[f64; 4]; 3]) -> Self {
        Self { rows }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Create a transform from a 3x3 linear block and a translation vector.
    pub fn from_rotation_translation(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> Self {
        let mut rows = [[0.0; 4]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            row[..3].copy_from_slice(&rotation[i]);
            row[3] = translation[i];
        }
        Self::new(rows)
    }

    /// Create a transform from rows of arbitrary length.
    ///
    /// Only the first 3 rows and the first 4 columns are used, so a 4x4
    /// homogeneous matrix is accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`Cloud3dError::DimensionMismatch`] if there are fewer than 3 rows
    /// or any of the first 3 rows has fewer than 4 columns.
    pub fn try_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, Cloud3dError> {
        if rows.len() < 3 {
            return Err(Cloud3dError::DimensionMismatch {
                expected: 3,
                actual: rows.len(),
            });
        }

        let mut out = [[0.0; 4]; 3];
        for (dst, src) in out.iter_mut().zip(rows) {
            let src = src.as_ref();
            if src.len() < 4 {
                return Err(Cloud3dError::DimensionMismatch {
                    expected: 4,
                    actual: src.len(),
                });
            }
            dst.copy_from_slice(&src[..4]);
        }

        Ok(Self::new(out))
    }

    /// Create a pure rotation about an axis.
    ///
    /// # Arguments
    ///
    /// * `axis` - The axis of rotation, normalized internally.
    /// * `angle` - The angle of rotation in radians.
    ///
    /// # Errors
    ///
    /// Returns [`Cloud3dError::ZeroAxis`] if the axis has (almost) zero length.
    ///
    /// Example:
    ///
    /// ```
    /// use lidarpost_3d::transforms::TransformMatrix;
    ///
    /// let axis = [1.0, 0.0, 0.0];
    /// let angle = std::f64::consts::PI / 2.0;
    /// let transform = TransformMatrix::from_axis_angle(&axis, angle).unwrap();
    /// assert_eq!(transform.translation(), [0.0, 0.0, 0.0]);
    /// ```
    pub fn from_axis_angle(axis: &[f64; 3], angle: f64) -> Result<Self, Cloud3dError> {
        // normalize the vector
        let axis_norm = {
            let magnitude = (axis[0].powi(2) + axis[1].powi(2) + axis[2].powi(2)).sqrt();
            match magnitude < 1e-10 {
                true => return Err(Cloud3dError::ZeroAxis),
                false => [
                    axis[0] / magnitude,
                    axis[1] / magnitude,
                    axis[2] / magnitude,
                ],
            }
        };

        let [x, y, z] = axis_norm;

        let c = angle.cos();
        let s = angle.sin();
        let t = 1.0 - c;

        let rotation = [
            [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
            [x * y * t + z * s, c + y * y * t, y * z * t - x * s],
            [x * z * t - y * s, y * z * t + x * s, c + z * z * t],
        ];

        Ok(Self::from_rotation_translation(&rotation, &[0.0; 3]))
    }

    /// Get the 3x4 rows of the transform.
    pub fn rows(&self) -> &[[f64; 4]; 3] {
        &self.rows
    }

    /// Get the leading 3x3 block of the transform.
    pub fn rotation(&self) -> [[f64; 3]; 3] {
        let mut rotation = [[0.0; 3]; 3];
        for (dst, src) in rotation.iter_mut().zip(&self.rows) {
            dst.copy_from_slice(&src[..3]);
        }
        rotation
    }

    /// Get the translation column of the transform.
    pub fn translation(&self) -> [f64; 3] {
        [self.rows[0][3], self.rows[1][3], self.rows[2][3]]
    }

    /// Get the 4x4 homogeneous form of the transform, with last row `[0, 0, 0, 1]`.
    pub fn to_homogeneous(&self) -> [[f64; 4]; 4] {
        [self.rows[0], self.rows[1], self.rows[2], [0.0, 0.0, 0.0, 1.0]]
    }

    /// Apply the transform to a single point.
    #[inline]
    pub fn apply(&self, p: &[f64; 3]) -> [f64; 3] {
        let r = &self.rows;
        [
            r[0][0] * p[0] + r[0][1] * p[1] + r[0][2] * p[2] + r[0][3],
            r[1][0] * p[0] + r[1][1] * p[1] + r[1][2] * p[2] + r[1][3],
            r[2][0] * p[0] + r[2][1] * p[1] + r[2][2] * p[2] + r[2][3],
        ]
    }

    /// Compose two transforms: the result applies `other` first, then `self`.
    pub fn compose(&self, other: &TransformMatrix) -> Self {
        let (r_a, t_a) = (self.rotation(), self.translation());
        let (r_b, t_b) = (other.rotation(), other.translation());

        let mut r_ab = [[0.0; 3]; 3];
        linalg::matmul33(&r_a, &r_b, &mut r_ab);

        let mut t_ab = [0.0; 3];
        linalg::mat33_mul_vec3(&r_a, &t_b, &mut t_ab);
        for (t, ta) in t_ab.iter_mut().zip(t_a) {
            *t += ta;
        }

        Self::from_rotation_translation(&r_ab, &t_ab)
    }

    /// Compute the inverse transform.
    ///
    /// The linear block is inverted in general form, so scaled or sheared
    /// transforms estimated by least squares are supported too.
    ///
    /// # Errors
    ///
    /// Returns [`Cloud3dError::Singular`] if the linear block is not invertible.
    pub fn inverse(&self) -> Result<Self, Cloud3dError> {
        let rotation = self.rotation();
        let translation = self.translation();

        let mut rotation_inv = [[0.0; 3]; 3];
        linalg::inverse_mat33(&rotation, &mut rotation_inv)?;

        // t' = -R^-1 * t
        let mut translation_inv = [0.0; 3];
        linalg::mat33_mul_vec3(&rotation_inv, &translation, &mut translation_inv);
        for t in translation_inv.iter_mut() {
            *t = -*t;
        }

        Ok(Self::from_rotation_translation(
            &rotation_inv,
            &translation_inv,
        ))
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::identity()
    }
}
